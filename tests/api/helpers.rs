use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::{Connection, PgConnection};
use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use std::sync::{Arc, Mutex, MutexGuard};
use subtrack::configuration::{get_configuration, Settings};
use subtrack::domain::UserEmail;
use subtrack::email::Email;
use subtrack::startup::{run_migrations, Application};
use subtrack::telemetry::{get_subscriber, init_subscriber};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".into();
    let subscriber_name = "test".into();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
}

#[derive(Default)]
pub struct MockEmailClient {
    pub sent_emails: Mutex<Vec<SentEmail>>,
}

#[async_trait]
impl Email for MockEmailClient {
    async fn send_email(
        &self,
        recipient: UserEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error> {
        self.sent_emails.lock().unwrap().push(SentEmail {
            recipient: recipient.as_ref().to_string(),
            subject: subject.to_string(),
            html_content: html_content.to_string(),
            text_content: text_content.to_string(),
        });
        Ok(())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub struct TestApp {
    pub address: String,
    pub db_connection: Mutex<PgConnection>,
    pub email_client: Arc<MockEmailClient>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub fn db(&self) -> MutexGuard<'_, PgConnection> {
        self.db_connection.lock().unwrap()
    }

    pub async fn sign_up(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/v1/auth/sign-up", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn sign_in(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/v1/auth/sign-in", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Signs up a fresh user with password `password123`.
    pub async fn create_user(&self, name: &str, email: &str) -> TestUser {
        let response = self
            .sign_up(&serde_json::json!({
                "name": name,
                "email": email,
                "password": "password123",
            }))
            .await;
        assert_eq!(201, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        TestUser {
            id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
            email: body["data"]["user"]["email"].as_str().unwrap().to_string(),
            token: body["data"]["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_admin(&self, name: &str, email: &str) -> TestUser {
        let user = self.create_user(name, email).await;
        self.promote_to_admin(&user.email);
        user
    }

    pub fn promote_to_admin(&self, email: &str) {
        use subtrack::schema::users;
        diesel::update(users::table.filter(users::email.eq(email)))
            .set(users::role.eq("admin"))
            .execute(&mut *self.db())
            .expect("Failed to promote the user.");
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        self.authorize(
            self.api_client.get(&format!("{}{}", &self.address, path)),
            token,
        )
    }

    pub fn post(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        self.authorize(
            self.api_client.post(&format!("{}{}", &self.address, path)),
            token,
        )
    }

    pub fn put(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        self.authorize(
            self.api_client.put(&format!("{}{}", &self.address, path)),
            token,
        )
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        self.authorize(
            self.api_client.delete(&format!("{}{}", &self.address, path)),
            token,
        )
    }

    fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn post_subscription(
        &self,
        token: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.post("/api/v1/subscriptions", Some(token))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Creates a monthly subscription starting today and returns its id.
    pub async fn create_subscription(&self, token: &str, renewal_date: NaiveDate) -> String {
        let response = self
            .post_subscription(token, &subscription_body("Netflix Premium", renewal_date))
            .await;
        assert_eq!(201, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub fn subscription_body(name: &str, renewal_date: NaiveDate) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "price": 15.99,
        "currency": "USD",
        "frequency": "monthly",
        "category": "entertainment",
        "payment_method": "card",
        "start_date": today().to_string(),
        "renewal_date": renewal_date.to_string(),
    })
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = None;
        c.database.database_name = Uuid::new_v4().to_string();
        c.reminders.enabled = false;
        c
    };

    let db_connection = setup_database(&configuration);
    let email_client = Arc::new(MockEmailClient::default());

    let app = Application::build(&configuration, email_client.clone())
        .await
        .expect("Failed to build application.");
    let port = app.port.clone();
    let _ = tokio::spawn(app.server.launch());
    TestApp {
        address: format!(
            "http://127.0.0.1:{}",
            port.get().await.expect("Failed to get the bound port.")
        ),
        db_connection: Mutex::new(db_connection),
        email_client,
        api_client: reqwest::Client::new(),
    }
}

fn setup_database(configuration: &Settings) -> PgConnection {
    let mut connection = PgConnection::establish(
        configuration
            .database
            .connection_string_without_database()
            .expose_secret(),
    )
    .expect("Failed to connect to Postgres.");

    diesel::sql_query(format!(
        "CREATE DATABASE \"{}\"",
        configuration.database.database_name
    ))
    .execute(&mut connection)
    .expect("Failed to create database.");

    let mut connection =
        PgConnection::establish(configuration.database.connection_string().expose_secret())
            .expect("Failed to connect to Postgres.");
    run_migrations(&mut connection).expect("Failed to migrate the database.");
    connection
}
