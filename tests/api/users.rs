use crate::helpers::spawn_app;
use uuid::Uuid;

#[tokio::test]
async fn listing_users_is_reserved_for_admins() {
    // arrange
    let app = spawn_app().await;
    let user = app.create_user("Regular", "regular@example.com").await;
    let admin = app.create_admin("Admin", "admin@example.com").await;

    // act
    let as_user = app.get("/api/v1/users", Some(&user.token)).send().await.unwrap();
    let as_admin = app.get("/api/v1/users", Some(&admin.token)).send().await.unwrap();

    // assert
    assert_eq!(403, as_user.status().as_u16());
    assert_eq!(200, as_admin.status().as_u16());
    let body: serde_json::Value = as_admin.json().await.unwrap();
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn get_user_validates_the_id() {
    let app = spawn_app().await;
    let user = app.create_user("Regular", "regular@example.com").await;

    let found = app
        .get(&format!("/api/v1/users/{}", user.id), Some(&user.token))
        .send()
        .await
        .unwrap();
    let malformed = app
        .get("/api/v1/users/not-a-uuid", Some(&user.token))
        .send()
        .await
        .unwrap();
    let missing = app
        .get(&format!("/api/v1/users/{}", Uuid::new_v4()), Some(&user.token))
        .send()
        .await
        .unwrap();

    assert_eq!(200, found.status().as_u16());
    assert_eq!(400, malformed.status().as_u16());
    assert_eq!(404, missing.status().as_u16());
}

#[tokio::test]
async fn create_user_returns_a_201_then_a_400_for_the_same_email() {
    let app = spawn_app().await;
    let body = serde_json::json!({
        "name": "Created Directly",
        "email": "direct@example.com",
        "password": "password123",
    });

    let first = app.post("/api/v1/users", None).json(&body).send().await.unwrap();
    let second = app.post("/api/v1/users", None).json(&body).send().await.unwrap();

    assert_eq!(201, first.status().as_u16());
    let created: serde_json::Value = first.json().await.unwrap();
    assert_eq!(created["data"]["email"], "direct@example.com");
    assert!(created["data"].get("token").is_none());
    assert_eq!(400, second.status().as_u16());
}
