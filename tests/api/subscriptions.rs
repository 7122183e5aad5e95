use crate::helpers::{days_from_today, spawn_app, subscription_body, today};
use diesel::RunQueryDsl;
use subtrack::models::Subscription;
use subtrack::schema::subscriptions::dsl::*;
use uuid::Uuid;

#[tokio::test]
async fn create_returns_a_201_and_persists_the_subscription() {
    // arrange
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;

    // act
    let response = app
        .post_subscription(&user.token, &subscription_body("Netflix Premium", days_from_today(30)))
        .await;

    // assert
    assert_eq!(201, response.status().as_u16());

    let saved = subscriptions
        .first::<Subscription>(&mut *app.db())
        .expect("Result set was empty.");

    assert_eq!(saved.name, "Netflix Premium");
    assert_eq!(saved.status, "active");
    assert_eq!(saved.user_id.to_string(), user.id);
    assert_eq!(saved.renewal_date, days_from_today(30));
}

#[tokio::test]
async fn a_missing_renewal_date_is_derived_from_the_frequency() {
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;
    let body = serde_json::json!({
        "name": "Gym Membership",
        "price": 40.0,
        "frequency": "weekly",
        "category": "other",
        "paymentMethod": "paypal",
        "startDate": today().to_string(),
    });

    let response = app.post_subscription(&user.token, &body).await;

    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["renewal_date"], days_from_today(7).to_string());
    assert_eq!(body["data"]["currency"], "USD");
    assert_eq!(body["data"]["status"], "active");
}

#[tokio::test]
async fn create_returns_a_400_when_fields_are_invalid() {
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;
    let valid = subscription_body("Netflix Premium", days_from_today(30));
    let with = |key: &str, value: serde_json::Value| {
        let mut body = valid.clone();
        body[key] = value;
        body
    };
    let test_cases = vec![
        (with("name", "N".into()), "a one character name"),
        (with("price", (-1.0).into()), "a negative price"),
        (with("frequency", "hourly".into()), "an unknown frequency"),
        (with("currency", "JPY".into()), "an unsupported currency"),
        (
            with("start_date", days_from_today(-1).to_string().into()),
            "a start date in the past",
        ),
        (
            with("renewal_date", today().to_string().into()),
            "a renewal date on the start date",
        ),
        (with("start_date", "next tuesday".into()), "an unparseable date"),
    ];

    for (body, description) in test_cases {
        let response = app.post_subscription(&user.token, &body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload had {}.",
            description
        );
    }
}

#[tokio::test]
async fn create_requires_authentication() {
    let app = spawn_app().await;

    let response = app
        .post("/api/v1/subscriptions", None)
        .json(&subscription_body("Netflix Premium", days_from_today(30)))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn owners_and_admins_can_read_a_subscription_but_others_cannot() {
    // arrange
    let app = spawn_app().await;
    let owner = app.create_user("Owner", "owner@example.com").await;
    let stranger = app.create_user("Stranger", "stranger@example.com").await;
    let admin = app.create_admin("Admin", "admin@example.com").await;
    let subscription_id = app.create_subscription(&owner.token, days_from_today(30)).await;
    let path = format!("/api/v1/subscriptions/{}", subscription_id);

    // act
    let as_owner = app.get(&path, Some(&owner.token)).send().await.unwrap();
    let as_stranger = app.get(&path, Some(&stranger.token)).send().await.unwrap();
    let as_admin = app.get(&path, Some(&admin.token)).send().await.unwrap();

    // assert
    assert_eq!(200, as_owner.status().as_u16());
    assert_eq!(403, as_stranger.status().as_u16());
    assert_eq!(200, as_admin.status().as_u16());
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_rejected() {
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;

    let missing = app
        .get(&format!("/api/v1/subscriptions/{}", Uuid::new_v4()), Some(&user.token))
        .send()
        .await
        .unwrap();
    let malformed = app
        .get("/api/v1/subscriptions/42", Some(&user.token))
        .send()
        .await
        .unwrap();

    assert_eq!(404, missing.status().as_u16());
    assert_eq!(400, malformed.status().as_u16());
}

#[tokio::test]
async fn listing_returns_only_the_callers_subscriptions() {
    let app = spawn_app().await;
    let first = app.create_user("First", "first@example.com").await;
    let second = app.create_user("Second", "second@example.com").await;
    app.create_subscription(&first.token, days_from_today(30)).await;
    app.create_subscription(&first.token, days_from_today(60)).await;
    app.create_subscription(&second.token, days_from_today(30)).await;

    let response = app
        .get("/api/v1/subscriptions", Some(&first.token))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|s| s["user_id"] == first.id.as_str()));
}

#[tokio::test]
async fn user_subscriptions_are_visible_to_the_owner_and_admins_only() {
    let app = spawn_app().await;
    let owner = app.create_user("Owner", "owner@example.com").await;
    let stranger = app.create_user("Stranger", "stranger@example.com").await;
    let admin = app.create_admin("Admin", "admin@example.com").await;
    app.create_subscription(&owner.token, days_from_today(30)).await;
    let path = format!("/api/v1/subscriptions/user/{}", owner.id);

    let as_owner = app.get(&path, Some(&owner.token)).send().await.unwrap();
    let as_stranger = app.get(&path, Some(&stranger.token)).send().await.unwrap();
    let as_admin = app.get(&path, Some(&admin.token)).send().await.unwrap();

    assert_eq!(200, as_owner.status().as_u16());
    assert_eq!(403, as_stranger.status().as_u16());
    assert_eq!(200, as_admin.status().as_u16());
    let body: serde_json::Value = as_admin.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listing_every_subscription_is_reserved_for_admins() {
    let app = spawn_app().await;
    let user = app.create_user("Regular", "regular@example.com").await;
    let admin = app.create_admin("Admin", "admin@example.com").await;
    app.create_subscription(&user.token, days_from_today(30)).await;
    app.create_subscription(&admin.token, days_from_today(30)).await;

    let as_user = app
        .get("/api/v1/subscriptions/all", Some(&user.token))
        .send()
        .await
        .unwrap();
    let as_admin = app
        .get("/api/v1/subscriptions/all", Some(&admin.token))
        .send()
        .await
        .unwrap();

    assert_eq!(403, as_user.status().as_u16());
    let body: serde_json::Value = as_admin.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn upcoming_renewals_cover_the_next_seven_days() {
    // arrange
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;
    let soon = app.create_subscription(&user.token, days_from_today(3)).await;
    let edge = app.create_subscription(&user.token, days_from_today(7)).await;
    app.create_subscription(&user.token, days_from_today(8)).await;
    let cancelled = app.create_subscription(&user.token, days_from_today(2)).await;
    app.put(
        &format!("/api/v1/subscriptions/{}/cancel", cancelled),
        Some(&user.token),
    )
    .send()
    .await
    .unwrap();

    // act
    let response = app
        .get("/api/v1/subscriptions/upcoming-renewals", Some(&user.token))
        .send()
        .await
        .unwrap();

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![soon.as_str(), edge.as_str()]);
}

#[tokio::test]
async fn update_applies_partial_changes() {
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;
    let subscription_id = app.create_subscription(&user.token, days_from_today(30)).await;

    let response = app
        .put(&format!("/api/v1/subscriptions/{}", subscription_id), Some(&user.token))
        .json(&serde_json::json!({"price": 17.99, "category": "shopping"}))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["price"], 17.99);
    assert_eq!(body["data"]["category"], "shopping");
    assert_eq!(body["data"]["name"], "Netflix Premium");
}

#[tokio::test]
async fn update_rejects_a_renewal_before_the_start() {
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;
    let subscription_id = app.create_subscription(&user.token, days_from_today(30)).await;

    let response = app
        .put(&format!("/api/v1/subscriptions/{}", subscription_id), Some(&user.token))
        .json(&serde_json::json!({"renewal_date": days_from_today(-1).to_string()}))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn update_into_the_past_marks_the_subscription_expired() {
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;
    let subscription_id = app.create_subscription(&user.token, days_from_today(30)).await;

    let response = app
        .put(&format!("/api/v1/subscriptions/{}", subscription_id), Some(&user.token))
        .json(&serde_json::json!({
            "start_date": days_from_today(-10).to_string(),
            "renewal_date": days_from_today(-3).to_string(),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "expired");
}

#[tokio::test]
async fn cancel_sets_the_status_and_strangers_cannot_cancel() {
    let app = spawn_app().await;
    let owner = app.create_user("Owner", "owner@example.com").await;
    let stranger = app.create_user("Stranger", "stranger@example.com").await;
    let subscription_id = app.create_subscription(&owner.token, days_from_today(30)).await;
    let path = format!("/api/v1/subscriptions/{}/cancel", subscription_id);

    let as_stranger = app.put(&path, Some(&stranger.token)).send().await.unwrap();
    let as_owner = app.put(&path, Some(&owner.token)).send().await.unwrap();

    assert_eq!(403, as_stranger.status().as_u16());
    assert_eq!(200, as_owner.status().as_u16());
    let saved = subscriptions
        .first::<Subscription>(&mut *app.db())
        .expect("Result set was empty.");
    assert_eq!(saved.status, "cancelled");
}

#[tokio::test]
async fn delete_removes_the_subscription() {
    let app = spawn_app().await;
    let user = app.create_user("Ursula", "ursula@example.com").await;
    let subscription_id = app.create_subscription(&user.token, days_from_today(30)).await;
    let path = format!("/api/v1/subscriptions/{}", subscription_id);

    let deleted = app.delete(&path, Some(&user.token)).send().await.unwrap();
    let fetched = app.get(&path, Some(&user.token)).send().await.unwrap();

    assert_eq!(200, deleted.status().as_u16());
    assert_eq!(404, fetched.status().as_u16());
    let remaining = subscriptions
        .load::<Subscription>(&mut *app.db())
        .expect("Failed to load subscriptions.");
    assert!(remaining.is_empty());
}
