// tests/ssr_tests.rs

mod common;

use common::{BOT_AGENT, BROWSER_AGENT, SPA_MARKER, TestApp, spawn_app, spawn_app_with, unique};
use reqwest::header::{REFERER, USER_AGENT};
use serde_json::{Value, json};

async fn published_post(app: &TestApp, cover_image: &str) -> String {
    let author = app.create_user("TEACHER").await;
    let slug = unique("post");
    let response = app
        .post_json(
            "/api/posts",
            &json!({
                "title": "Phrasal verbs",
                "slug": slug,
                "summary": "Learn the most common phrasal verbs",
                "content": "<p>Body</p>",
                "authorEmail": author["email"],
                "coverImage": cover_image,
                "published": true
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    slug
}

async fn fetch_as(app: &TestApp, path: &str, user_agent: &str) -> reqwest::Response {
    app.client
        .get(app.url(path))
        .header(USER_AGENT, user_agent)
        .header(REFERER, "https://www.google.com/")
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn bots_get_meta_document_for_posts() {
    // Arrange
    let app = spawn_app().await;
    let slug = published_post(&app, "https://cdn.example.com/cover.jpg").await;

    // Act
    let response = fetch_as(&app, &format!("/blog/{}", slug), BOT_AGENT).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"<meta property="og:title" content="Phrasal verbs - EduGuiders Blog">"#));
    assert!(html.contains(r#"<meta property="og:type" content="article">"#));
    assert!(html.contains("https://cdn.example.com/cover.jpg"));
    assert!(html.contains(&format!("https://ieduguide.com/blog/{}", slug)));
    assert!(!html.contains(SPA_MARKER));
}

#[tokio::test]
async fn inline_images_fall_back_to_default() {
    // Arrange
    let app = spawn_app().await;
    let slug = published_post(&app, "data:image/png;base64,AAAA").await;

    // Act
    let response = fetch_as(&app, &format!("/blog/{}", slug), BOT_AGENT).await;

    // Assert
    let html = response.text().await.unwrap();
    assert!(!html.contains("data:image/png"));
    assert!(html.contains("https://ieduguide.com/images/default-blog.jpg"));
}

#[tokio::test]
async fn bots_get_404_document_for_missing_entities() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let post = fetch_as(&app, "/blog/does-not-exist", BOT_AGENT).await;
    let teacher = fetch_as(&app, "/teachers/nobody", BOT_AGENT).await;

    // Assert
    assert_eq!(post.status().as_u16(), 404);
    let html = post.text().await.unwrap();
    assert!(html.contains("Post Not Found - EduGuiders"));

    assert_eq!(teacher.status().as_u16(), 404);
    let html = teacher.text().await.unwrap();
    assert!(html.contains("Teacher Not Found - EduGuiders"));
}

#[tokio::test]
async fn unpublished_posts_are_not_described() {
    // Arrange
    let app = spawn_app().await;
    let author = app.create_user("TEACHER").await;
    let slug = unique("draft");
    app.post_json(
        "/api/posts",
        &json!({
            "title": "Draft",
            "slug": slug,
            "summary": "s",
            "content": "c",
            "authorEmail": author["email"],
            "published": false
        }),
    )
    .await;

    // Act
    let response = fetch_as(&app, &format!("/blog/{}", slug), BOT_AGENT).await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn blank_summaries_use_a_bounded_excerpt_of_the_content() {
    // Arrange
    let app = spawn_app().await;
    let author = app.create_user("TEACHER").await;
    let slug = unique("post");
    let content = format!("<p>{}</p>", "grammar ".repeat(40));
    let response = app
        .post_json(
            "/api/posts",
            &json!({
                "title": "Long read",
                "slug": slug,
                "summary": " ",
                "content": content,
                "authorEmail": author["email"],
                "published": true
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    // Act
    let response = fetch_as(&app, &format!("/blog/{}", slug), BOT_AGENT).await;

    // Assert
    let html = response.text().await.unwrap();
    let marker = r#"<meta name="description" content=""#;
    let start = html.find(marker).unwrap() + marker.len();
    let description = &html[start..start + html[start..].find('"').unwrap()];
    assert!(description.starts_with("grammar grammar"));
    assert!(description.ends_with("..."));
    assert!(description.chars().count() <= 160);
}

#[tokio::test]
async fn store_failures_render_the_error_document() {
    // Arrange
    let app = spawn_app().await;
    app.db.close().await;

    // Act
    let response = fetch_as(&app, "/blog/any-post", BOT_AGENT).await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let html = response.text().await.unwrap();
    assert!(html.contains("<title>Error - EduGuiders</title>"));
    assert!(!html.contains(SPA_MARKER));
}

#[tokio::test]
async fn index_pages_get_site_metadata() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = fetch_as(&app, "/dynamics", BOT_AGENT).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("<title>Teaching Dynamics - EduGuiders</title>"));
    assert!(html.contains(r#"<meta property="og:type" content="website">"#));
}

#[tokio::test]
async fn browsers_get_the_single_page_app() {
    // Arrange
    let app = spawn_app().await;
    let slug = published_post(&app, "").await;

    // Act
    let response = fetch_as(&app, &format!("/blog/{}", slug), BROWSER_AGENT).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains(SPA_MARKER));
}

#[tokio::test]
async fn api_and_assets_are_never_intercepted() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let api = fetch_as(&app, "/api/posts", BOT_AGENT).await;
    let asset = fetch_as(&app, "/blog/logo.png", BOT_AGENT).await;

    // Assert
    assert_eq!(api.status().as_u16(), 200);
    let body: Value = api.json().await.unwrap();
    assert_eq!(body["success"], true);

    let html = asset.text().await.unwrap();
    assert!(html.contains(SPA_MARKER));
}

#[tokio::test]
async fn direct_links_get_meta_document_when_enabled() {
    // Arrange
    let app = spawn_app_with(|config| config.ssr_direct_links = true).await;

    // Act
    let direct = app
        .client
        .get(app.url("/exercises"))
        .header(USER_AGENT, BROWSER_AGENT)
        .send()
        .await
        .expect("Failed to execute request");
    let referred = fetch_as(&app, "/exercises", BROWSER_AGENT).await;

    // Assert
    let html = direct.text().await.unwrap();
    assert!(html.contains("<title>English Exercises - EduGuiders</title>"));

    let html = referred.text().await.unwrap();
    assert!(html.contains(SPA_MARKER));
}

#[tokio::test]
async fn public_teacher_profiles_are_described() {
    // Arrange
    let app = spawn_app().await;
    let teacher = app.create_user("TEACHER").await;
    app.post_json(
        "/api/teacher-profiles",
        &json!({
            "userId": teacher["id"],
            "displayName": "Ms. Rivera",
            "specializations": ["IELTS", "Business English"],
            "yearsExperience": 8
        }),
    )
    .await;

    // Act
    let response = fetch_as(
        &app,
        &format!("/teachers/{}", teacher["id"].as_str().unwrap()),
        BOT_AGENT,
    )
    .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Ms. Rivera - English Teacher Profile"));
    assert!(html.contains(
        "Professional English teacher specializing in IELTS, Business English. 8 years of experience."
    ));
    assert!(html.contains(r#"<meta property="og:type" content="profile">"#));
}
