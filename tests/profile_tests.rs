// tests/profile_tests.rs

mod common;

use common::{TestApp, spawn_app};
use serde_json::{Value, json};

async fn teacher_with_profile(app: &TestApp, display_name: &str) -> Value {
    let teacher = app.create_user("TEACHER").await;
    let response = app
        .post_json(
            "/api/teacher-profiles",
            &json!({
                "userId": teacher["id"],
                "displayName": display_name,
                "tagline": "Grammar made simple",
                "teachingLanguages": ["English", "Spanish"],
                "specializations": ["IELTS"]
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    teacher
}

#[tokio::test]
async fn only_teachers_get_one_profile() {
    // Arrange
    let app = spawn_app().await;
    let student = app.create_user("STUDENT").await;
    let teacher = teacher_with_profile(&app, "Ms. Rivera").await;

    // Act
    let for_student = app
        .post_json("/api/teacher-profiles", &json!({ "userId": student["id"] }))
        .await;
    let second = app
        .post_json("/api/teacher-profiles", &json!({ "userId": teacher["id"] }))
        .await;

    // Assert
    assert_eq!(for_student.status().as_u16(), 400);
    assert_eq!(second.status().as_u16(), 400);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["message"], "Teacher profile already exists");
}

#[tokio::test]
async fn profile_listing_filters_by_language() {
    // Arrange
    let app = spawn_app().await;
    teacher_with_profile(&app, "Bilingual").await;
    let other = app.create_user("TEACHER").await;
    app.post_json(
        "/api/teacher-profiles",
        &json!({ "userId": other["id"], "teachingLanguages": ["French"] }),
    )
    .await;

    // Act
    let response = app.get("/api/teacher-profiles?languages=Spanish").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["displayName"], "Bilingual");
    assert_eq!(body["pagination"]["limit"], 12);
}

#[tokio::test]
async fn private_profiles_are_hidden_from_listing() {
    // Arrange
    let app = spawn_app().await;
    let teacher = teacher_with_profile(&app, "Hidden").await;
    let user_id = teacher["id"].as_str().unwrap();

    // Act
    let updated = app
        .put_json(
            &format!("/api/teacher-profiles/{}", user_id),
            &json!({ "isPublic": false }),
        )
        .await;
    let listed = app.get("/api/teacher-profiles").await;

    // Assert
    assert_eq!(updated.status().as_u16(), 200);
    let body: Value = listed.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn profile_views_are_counted() {
    // Arrange
    let app = spawn_app().await;
    let teacher = teacher_with_profile(&app, "Popular").await;
    let user_id = teacher["id"].as_str().unwrap();

    // Act
    for _ in 0..2 {
        let response = app
            .post_json(&format!("/api/teacher-profiles/{}/view", user_id), &json!({}))
            .await;
        assert_eq!(response.status().as_u16(), 200);
    }
    let profile = app.get(&format!("/api/teacher-profiles/{}", user_id)).await;
    let missing = app
        .post_json("/api/teacher-profiles/nobody/view", &json!({}))
        .await;

    // Assert
    let body: Value = profile.json().await.unwrap();
    assert_eq!(body["data"]["profileViews"], 2);
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn profile_detail_includes_credentials_and_visible_sections() {
    // Arrange
    let app = spawn_app().await;
    let teacher = teacher_with_profile(&app, "Dr. Lee").await;
    let user_id = teacher["id"].as_str().unwrap();
    let base = format!("/api/teacher-profiles/{}", user_id);

    let education = app
        .post_json(
            &format!("{}/education", base),
            &json!({ "degree": "BA", "institution": "UNAM", "startYear": 2010 }),
        )
        .await;
    let certification = app
        .post_json(
            &format!("{}/certifications", base),
            &json!({ "name": "CELTA", "issuer": "Cambridge", "issueDate": "2015-06-01" }),
        )
        .await;
    let experience = app
        .post_json(
            &format!("{}/experience", base),
            &json!({
                "title": "Teacher",
                "company": "Academy",
                "startDate": "2016-01-01T00:00:00Z",
                "isCurrent": true
            }),
        )
        .await;
    let visible = app
        .post_json(
            &format!("{}/sections", base),
            &json!({ "sectionType": "about", "title": "About me", "content": "Hi" }),
        )
        .await;
    let hidden = app
        .post_json(
            &format!("{}/sections", base),
            &json!({ "sectionType": "custom", "title": "Draft", "isVisible": false }),
        )
        .await;

    // Act
    let detail = app.get(&base).await;
    let all_sections = app.get(&format!("{}/sections", base)).await;

    // Assert
    assert_eq!(education.status().as_u16(), 201);
    assert_eq!(certification.status().as_u16(), 201);
    assert_eq!(experience.status().as_u16(), 201);
    assert_eq!(visible.status().as_u16(), 201);
    assert_eq!(hidden.status().as_u16(), 201);

    let body: Value = detail.json().await.unwrap();
    assert_eq!(body["data"]["education"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["certifications"][0]["issueDate"], "2015-06-01");
    assert_eq!(body["data"]["experience"][0]["startDate"], "2016-01-01");
    assert_eq!(body["data"]["sections"].as_array().unwrap().len(), 1);
    assert!(body["data"]["recentPosts"].as_array().unwrap().is_empty());

    let body: Value = all_sections.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn child_records_are_scoped_to_their_profile() {
    // Arrange
    let app = spawn_app().await;
    let owner = teacher_with_profile(&app, "Owner").await;
    let intruder = teacher_with_profile(&app, "Intruder").await;
    let created = app
        .post_json(
            &format!("/api/teacher-profiles/{}/education", owner["id"].as_str().unwrap()),
            &json!({ "degree": "MA", "institution": "UBA", "startYear": 2012 }),
        )
        .await;
    let body: Value = created.json().await.unwrap();
    let education_id = body["data"]["id"].as_str().unwrap().to_string();

    // Act
    let foreign_delete = app
        .delete(&format!(
            "/api/teacher-profiles/{}/education/{}",
            intruder["id"].as_str().unwrap(),
            education_id
        ))
        .await;
    let own_update = app
        .put_json(
            &format!(
                "/api/teacher-profiles/{}/education/{}",
                owner["id"].as_str().unwrap(),
                education_id
            ),
            &json!({ "degree": "PhD" }),
        )
        .await;

    // Assert
    assert_eq!(foreign_delete.status().as_u16(), 404);
    assert_eq!(own_update.status().as_u16(), 200);
    let body: Value = own_update.json().await.unwrap();
    assert_eq!(body["data"]["degree"], "PhD");
}

#[tokio::test]
async fn deleting_a_profile_removes_it() {
    // Arrange
    let app = spawn_app().await;
    let teacher = teacher_with_profile(&app, "Leaving").await;
    let path = format!("/api/teacher-profiles/{}", teacher["id"].as_str().unwrap());

    // Act
    let deleted = app.delete(&path).await;
    let fetched = app.get(&path).await;

    // Assert
    assert_eq!(deleted.status().as_u16(), 200);
    assert_eq!(fetched.status().as_u16(), 404);
}
