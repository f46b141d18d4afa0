// tests/package_tests.rs

mod common;

use common::{TestApp, spawn_app, unique};
use serde_json::{Value, json};

/// A package holding one BEGINNER and one ADVANCED exercise.
async fn package_with_exercises(app: &TestApp) -> (Value, Value, Vec<String>) {
    let teacher = app.create_user("TEACHER").await;
    let email = teacher["email"].as_str().unwrap();
    let package = app.create_package(30).await;
    let package_id = package["id"].as_str().unwrap();

    let mut exercise_ids = Vec::new();
    for difficulty in ["ADVANCED", "BEGINNER"] {
        let exercise = app.create_exercise(email, difficulty).await;
        let id = exercise["id"].as_str().unwrap().to_string();
        let response = app
            .post_json(
                &format!("/api/exercise-packages/{}/exercises", package_id),
                &json!({ "exerciseId": id }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200);
        exercise_ids.push(id);
    }

    (package, teacher, exercise_ids)
}

#[tokio::test]
async fn duplicate_package_slug_is_400() {
    // Arrange
    let app = spawn_app().await;
    let payload = json!({ "title": "T", "slug": unique("pkg"), "description": "D" });

    // Act
    let first = app.post_json("/api/exercise-packages", &payload).await;
    let second = app.post_json("/api/exercise-packages", &payload).await;

    // Assert
    assert_eq!(first.status().as_u16(), 201);
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["data"]["maxExercises"], 30);
    assert_eq!(second.status().as_u16(), 400);
}

#[tokio::test]
async fn package_detail_orders_exercises_by_difficulty() {
    // Arrange
    let app = spawn_app().await;
    let (package, _, _) = package_with_exercises(&app).await;

    // Act
    let response = app
        .get(&format!("/api/exercise-packages/slug/{}", package["slug"].as_str().unwrap()))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let exercises = body["data"]["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[0]["difficulty"], "BEGINNER");
    assert_eq!(exercises[1]["difficulty"], "ADVANCED");
    assert_eq!(body["data"]["exerciseCount"], 2);
}

#[tokio::test]
async fn full_package_rejects_new_exercises() {
    // Arrange
    let app = spawn_app().await;
    let teacher = app.create_user("TEACHER").await;
    let email = teacher["email"].as_str().unwrap();
    let package = app.create_package(1).await;
    let path = format!("/api/exercise-packages/{}/exercises", package["id"].as_str().unwrap());
    let first = app.create_exercise(email, "BEGINNER").await;
    let second = app.create_exercise(email, "BEGINNER").await;

    // Act
    let accepted = app.post_json(&path, &json!({ "exerciseId": first["id"] })).await;
    let again = app.post_json(&path, &json!({ "exerciseId": first["id"] })).await;
    let rejected = app.post_json(&path, &json!({ "exerciseId": second["id"] })).await;

    // Assert
    assert_eq!(accepted.status().as_u16(), 200);
    assert_eq!(again.status().as_u16(), 200);
    assert_eq!(rejected.status().as_u16(), 400);
    let body: Value = rejected.json().await.unwrap();
    assert_eq!(body["message"], "Package has reached maximum capacity of 1 exercises");
}

#[tokio::test]
async fn completing_twice_does_not_duplicate_progress() {
    // Arrange
    let app = spawn_app().await;
    let (package, _, exercise_ids) = package_with_exercises(&app).await;
    let student = app.create_user("STUDENT").await;
    let package_id = package["id"].as_str().unwrap();
    let path = format!("/api/exercise-packages/{}/complete", package_id);
    let payload = json!({ "exerciseId": exercise_ids[0], "userEmail": student["email"] });

    // Act
    let first = app.post_json(&path, &payload).await;
    let second = app.post_json(&path, &payload).await;
    let progress = app
        .get(&format!(
            "/api/exercise-packages/{}/progress?userEmail={}",
            package_id,
            student["email"].as_str().unwrap()
        ))
        .await;

    // Assert
    assert_eq!(first.status().as_u16(), 200);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["data"]["completedExercises"], json!([exercise_ids[0]]));
    assert_eq!(body["data"]["completionRate"], 50.0);

    let body: Value = progress.json().await.unwrap();
    assert_eq!(body["totalExercises"], 2);
    assert_eq!(body["data"]["completionRate"], 50.0);

    let exercise = app.get(&format!("/api/exercises/{}", exercise_ids[0])).await;
    let body: Value = exercise.json().await.unwrap();
    assert_eq!(body["data"]["timesCompleted"], 2);
}

#[tokio::test]
async fn completion_requires_exercise_in_package() {
    // Arrange
    let app = spawn_app().await;
    let (package, teacher, _) = package_with_exercises(&app).await;
    let loose = app
        .create_exercise(teacher["email"].as_str().unwrap(), "BEGINNER")
        .await;

    // Act
    let response = app
        .post_json(
            &format!("/api/exercise-packages/{}/complete", package["id"].as_str().unwrap()),
            &json!({ "exerciseId": loose["id"], "userEmail": teacher["email"] }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn progress_requires_user_email() {
    // Arrange
    let app = spawn_app().await;
    let package = app.create_package(5).await;

    // Act
    let response = app
        .get(&format!("/api/exercise-packages/{}/progress", package["id"].as_str().unwrap()))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn list_marks_completed_exercises_for_user() {
    // Arrange
    let app = spawn_app().await;
    let (package, _, exercise_ids) = package_with_exercises(&app).await;
    let student = app.create_user("STUDENT").await;
    let package_id = package["id"].as_str().unwrap();
    app.post_json(
        &format!("/api/exercise-packages/{}/complete", package_id),
        &json!({ "exerciseId": exercise_ids[1], "userEmail": student["email"] }),
    )
    .await;

    // Act
    let response = app
        .get(&format!(
            "/api/exercise-packages/{}/exercises?userEmail={}",
            package_id,
            student["email"].as_str().unwrap()
        ))
        .await;

    // Assert
    let body: Value = response.json().await.unwrap();
    let exercises = body["data"].as_array().unwrap();
    let completed: Vec<&Value> = exercises.iter().filter(|e| e["completed"] == true).collect();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["id"], exercise_ids[1].as_str());
}

#[tokio::test]
async fn search_finds_packages_through_exercises() {
    // Arrange
    let app = spawn_app().await;
    let teacher = app.create_user("TEACHER").await;
    let package = app.create_package(10).await;
    let response = app
        .post_json(
            "/api/exercises",
            &json!({
                "title": "Irregular verbs drill",
                "type": "quiz",
                "content": { "q": "went" },
                "authorEmail": teacher["email"],
                "packageId": package["id"]
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    // Act
    let found = app.get("/api/exercise-packages/search?q=irregular").await;
    let none = app.get("/api/exercise-packages/search?q=astronomy").await;
    let missing_q = app.get("/api/exercise-packages/search").await;

    // Assert
    let body: Value = found.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], package["id"]);
    assert_eq!(items[0]["totalMatches"], 1);

    let body: Value = none.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(missing_q.status().as_u16(), 400);
}

#[tokio::test]
async fn deleting_a_package_detaches_its_exercises() {
    // Arrange
    let app = spawn_app().await;
    let (package, _, exercise_ids) = package_with_exercises(&app).await;

    // Act
    let response = app
        .delete(&format!("/api/exercise-packages/{}", package["id"].as_str().unwrap()))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let exercise = app.get(&format!("/api/exercises/{}", exercise_ids[0])).await;
    assert_eq!(exercise.status().as_u16(), 200);
    let body: Value = exercise.json().await.unwrap();
    assert!(body["data"]["packageId"].is_null());
}

#[tokio::test]
async fn difficulty_boxes_are_unique_per_level() {
    // Arrange
    let app = spawn_app().await;
    let package = app.create_package(10).await;
    let package_id = package["id"].as_str().unwrap();
    let payload = json!({
        "packageId": package_id,
        "difficulty": "BEGINNER",
        "title": "Start here",
        "article": "Read this first"
    });

    // Act
    let created = app.post_json("/api/package-difficulty-boxes", &payload).await;
    let duplicate = app.post_json("/api/package-difficulty-boxes", &payload).await;
    let by_level = app
        .get(&format!(
            "/api/package-difficulty-boxes/package/{}/difficulty/beginner",
            package_id
        ))
        .await;
    let other_level = app
        .get(&format!(
            "/api/package-difficulty-boxes/package/{}/difficulty/ADVANCED",
            package_id
        ))
        .await;

    // Assert
    assert_eq!(created.status().as_u16(), 201);
    assert_eq!(duplicate.status().as_u16(), 400);
    assert_eq!(by_level.status().as_u16(), 200);
    let body: Value = by_level.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Start here");
    assert_eq!(other_level.status().as_u16(), 404);
}

#[tokio::test]
async fn difficulty_box_requires_existing_package() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let created = app
        .post_json(
            "/api/package-difficulty-boxes",
            &json!({
                "packageId": "missing",
                "difficulty": "ADVANCED",
                "title": "t",
                "article": "a"
            }),
        )
        .await;
    let listed = app.get("/api/package-difficulty-boxes/package/missing").await;

    // Assert
    assert_eq!(created.status().as_u16(), 404);
    assert_eq!(listed.status().as_u16(), 404);
}

#[tokio::test]
async fn bulk_difficulty_boxes_roll_back_on_duplicate() {
    // Arrange
    let app = spawn_app().await;
    let package = app.create_package(10).await;
    let package_id = package["id"].as_str().unwrap();
    let entry = |difficulty: &str| json!({ "difficulty": difficulty, "title": "t", "article": "a" });

    // Act
    let rejected = app
        .post_json(
            "/api/package-difficulty-boxes/bulk",
            &json!({
                "packageId": package_id,
                "difficultyBoxes": [entry("BEGINNER"), entry("BEGINNER")]
            }),
        )
        .await;
    let accepted = app
        .post_json(
            "/api/package-difficulty-boxes/bulk",
            &json!({
                "packageId": package_id,
                "difficultyBoxes": [entry("ADVANCED"), entry("BEGINNER")]
            }),
        )
        .await;
    let listed = app
        .get(&format!("/api/package-difficulty-boxes/package/{}", package_id))
        .await;

    // Assert
    assert_eq!(rejected.status().as_u16(), 400);
    assert_eq!(accepted.status().as_u16(), 201);
    let body: Value = listed.json().await.unwrap();
    let boxes = body["data"].as_array().unwrap();
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0]["difficulty"], "BEGINNER");
    assert_eq!(body["packageInfo"]["id"], package_id);
}
