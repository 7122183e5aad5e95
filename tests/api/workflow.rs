use crate::helpers::{days_from_today, spawn_app};

#[tokio::test]
async fn only_admins_can_trigger_the_reminder_sweep() {
    let app = spawn_app().await;
    let user = app.create_user("Regular", "regular@example.com").await;

    let as_user = app
        .post("/api/v1/workflow/reminders", Some(&user.token))
        .send()
        .await
        .unwrap();
    let anonymous = app
        .post("/api/v1/workflow/reminders", None)
        .send()
        .await
        .unwrap();

    assert_eq!(403, as_user.status().as_u16());
    assert_eq!(401, anonymous.status().as_u16());
    assert!(app.email_client.sent_emails.lock().unwrap().is_empty());
}

#[tokio::test]
async fn the_sweep_emails_owners_whose_renewal_hits_a_reminder_offset() {
    // arrange
    let app = spawn_app().await;
    let owner = app.create_user("Ursula", "ursula@example.com").await;
    let admin = app.create_admin("Admin", "admin@example.com").await;
    app.create_subscription(&owner.token, days_from_today(7)).await;
    app.create_subscription(&owner.token, days_from_today(3)).await;
    app.create_subscription(&owner.token, days_from_today(1)).await;
    let cancelled = app.create_subscription(&owner.token, days_from_today(2)).await;
    app.put(
        &format!("/api/v1/subscriptions/{}/cancel", cancelled),
        Some(&owner.token),
    )
    .send()
    .await
    .unwrap();

    // act
    let response = app
        .post("/api/v1/workflow/reminders", Some(&admin.token))
        .send()
        .await
        .unwrap();

    // assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["evaluated"], 3);
    assert_eq!(body["data"]["due"], 2);
    assert_eq!(body["data"]["sent"], 2);
    assert_eq!(body["data"]["failed"], 0);

    let emails = app.email_client.sent_emails.lock().unwrap();
    assert_eq!(emails.len(), 2, "Expected 2 emails, {} were sent", emails.len());
    assert!(emails.iter().all(|e| e.recipient == "ursula@example.com"));
    assert!(emails.iter().any(|e| e.subject.contains("Renews in 7 Days")));
    assert!(emails.iter().any(|e| e.subject.contains("Renews Tomorrow")));
    assert!(emails
        .iter()
        .all(|e| e.html_content.contains("Ursula") && e.text_content.contains("Netflix Premium")));
}

#[tokio::test]
async fn triggering_twice_sends_the_reminders_twice() {
    let app = spawn_app().await;
    let owner = app.create_user("Ursula", "ursula@example.com").await;
    let admin = app.create_admin("Admin", "admin@example.com").await;
    app.create_subscription(&owner.token, days_from_today(5)).await;

    for _ in 0..2 {
        let response = app
            .post("/api/v1/workflow/reminders", Some(&admin.token))
            .send()
            .await
            .unwrap();
        assert_eq!(200, response.status().as_u16());
    }

    assert_eq!(app.email_client.sent_emails.lock().unwrap().len(), 2);
}
