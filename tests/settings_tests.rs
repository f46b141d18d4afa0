// tests/settings_tests.rs

mod common;

use common::{spawn_app, unique};
use serde_json::{Value, json};

fn page_config_payload() -> Value {
    json!({
        "description": "Language learning platform",
        "address": "Main St 1",
        "phone": "+51 999 999 999",
        "email": "hello@example.com",
        "siteName": "EduGuiders Test",
        "googleAnalyticsId": "G-SECRET",
        "webhookSecret": "shh"
    })
}

#[tokio::test]
async fn config_setting_defaults_and_duplicate_key() {
    // Arrange
    let app = spawn_app().await;
    let key = unique("site.theme");
    let payload = json!({ "key": key, "value": "dark" });

    // Act
    let first = app.post_json("/api/config-settings", &payload).await;
    let second = app.post_json("/api/config-settings", &payload).await;
    let by_key = app.get(&format!("/api/config-settings/key/{}", key)).await;

    // Assert
    assert_eq!(first.status().as_u16(), 201);
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["data"]["category"], "general");
    assert_eq!(body["data"]["dataType"], "string");
    assert_eq!(body["data"]["isPublic"], false);

    assert_eq!(second.status().as_u16(), 400);
    assert_eq!(by_key.status().as_u16(), 200);
}

#[tokio::test]
async fn config_setting_update_and_delete_by_key() {
    // Arrange
    let app = spawn_app().await;
    let key = unique("limits.max");
    app.post_json(
        "/api/config-settings",
        &json!({ "key": key, "value": "10", "dataType": "number", "isPublic": true }),
    )
    .await;

    // Act
    let updated = app
        .put_json(&format!("/api/config-settings/key/{}", key), &json!({ "value": "20" }))
        .await;
    let public = app.get("/api/config-settings/public").await;
    let deleted = app.delete(&format!("/api/config-settings/key/{}", key)).await;
    let deleted_again = app.delete(&format!("/api/config-settings/key/{}", key)).await;

    // Assert
    let body: Value = updated.json().await.unwrap();
    assert_eq!(body["data"]["value"], "20");
    assert_eq!(body["data"]["key"], key.as_str());

    let body: Value = public.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    assert_eq!(deleted.status().as_u16(), 200);
    assert_eq!(deleted_again.status().as_u16(), 404);
}

#[tokio::test]
async fn bulk_settings_reject_the_whole_batch_on_duplicates() {
    // Arrange
    let app = spawn_app().await;
    let key = unique("bulk");

    // Act
    let rejected = app
        .post_json(
            "/api/config-settings/bulk",
            &json!({ "settings": [
                { "key": key, "value": "a" },
                { "key": key, "value": "b" }
            ] }),
        )
        .await;
    let accepted = app
        .post_json(
            "/api/config-settings/bulk",
            &json!({ "settings": [
                { "key": unique("bulk"), "value": "a", "category": "ui" },
                { "key": unique("bulk"), "value": "b", "category": "ui" }
            ] }),
        )
        .await;
    let listed = app.get("/api/config-settings?category=ui").await;

    // Assert
    assert_eq!(rejected.status().as_u16(), 400);
    assert_eq!(accepted.status().as_u16(), 201);
    let body: Value = listed.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["limit"], 20);
}

#[tokio::test]
async fn page_config_is_a_singleton() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let empty = app.get("/api/page-config").await;
    let created = app.post_json("/api/page-config", &page_config_payload()).await;
    let second = app.post_json("/api/page-config", &page_config_payload()).await;

    // Assert
    let body: Value = empty.json().await.unwrap();
    assert!(empty_status(&body));
    assert!(body["data"].is_null());

    assert_eq!(created.status().as_u16(), 201);
    let body: Value = created.json().await.unwrap();
    assert_eq!(body["data"]["siteName"], "EduGuiders Test");
    assert_eq!(body["data"]["pointsPerExercise"], 10);

    assert_eq!(second.status().as_u16(), 400);
}

fn empty_status(body: &Value) -> bool {
    body["success"] == true && body["message"] == "No page configuration found. Please create one."
}

#[tokio::test]
async fn public_page_config_hides_private_settings() {
    // Arrange
    let app = spawn_app().await;
    app.post_json("/api/page-config", &page_config_payload()).await;

    // Act
    let response = app.get("/api/page-config/public").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["siteName"], "EduGuiders Test");
    assert!(body["data"].get("googleAnalyticsId").is_none());
    assert!(body["data"].get("webhookSecret").is_none());
}

#[tokio::test]
async fn page_config_update_and_reset() {
    // Arrange
    let app = spawn_app().await;
    let created = app.post_json("/api/page-config", &page_config_payload()).await;
    let body: Value = created.json().await.unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Act
    let updated = app
        .put_json(
            &format!("/api/page-config/{}", id),
            &json!({ "maintenanceMode": true, "phone": "+1 555" }),
        )
        .await;
    let reset = app
        .post_json(&format!("/api/page-config/{}/reset", id), &json!({ "updatedBy": "admin" }))
        .await;
    let reset_without_body = app
        .client
        .post(app.url(&format!("/api/page-config/{}/reset", id)))
        .send()
        .await
        .expect("Failed to execute request");
    let missing = app
        .post_json("/api/page-config/does-not-exist/reset", &json!({}))
        .await;

    // Assert
    let body: Value = updated.json().await.unwrap();
    assert_eq!(body["data"]["maintenanceMode"], true);
    assert_eq!(body["data"]["phone"], "+1 555");

    let body: Value = reset.json().await.unwrap();
    assert_eq!(body["data"]["maintenanceMode"], false);
    assert_eq!(body["data"]["siteName"], "EduGuiders");
    assert_eq!(body["data"]["phone"], "+1 555");
    assert_eq!(body["data"]["updatedBy"], "admin");

    let body: Value = reset_without_body.json().await.unwrap();
    assert_eq!(body["data"]["updatedBy"], "system");

    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn image_upload_list_and_delete() {
    // Arrange
    let app = spawn_app().await;
    let part = reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name("cover photo.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    // Act
    let uploaded = app
        .client
        .post(app.url("/api/images"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = uploaded.json().await.unwrap();
    let image = body["data"].clone();
    let listed = app.get("/api/images").await;
    let served = app
        .client
        .get(image["url"].as_str().unwrap())
        .send()
        .await
        .expect("Failed to execute request");
    let deleted = app
        .delete(&format!("/api/images/{}", image["id"].as_str().unwrap()))
        .await;
    let deleted_again = app
        .delete(&format!("/api/images/{}", image["id"].as_str().unwrap()))
        .await;

    // Assert
    assert_eq!(body["success"], true);
    assert_eq!(image["format"], "png");
    assert!(image["id"].as_str().unwrap().starts_with("uploads/"));

    let body: Value = listed.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(deleted.status().as_u16(), 200);
    assert_eq!(deleted_again.status().as_u16(), 404);
}

#[tokio::test]
async fn image_upload_rejects_other_files() {
    // Arrange
    let app = spawn_app().await;
    let part = reqwest::multipart::Part::text("hello")
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    // Act
    let wrong_type = app
        .client
        .post(app.url("/api/images"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    let no_file = app
        .client
        .post(app.url("/api/images"))
        .multipart(reqwest::multipart::Form::new().text("other", "x"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(wrong_type.status().as_u16(), 400);
    assert_eq!(no_file.status().as_u16(), 400);
}
