use crate::catchers::*;
use crate::configuration::Settings;
use crate::email::Email;
use crate::port_saver;
use crate::port_saver::Port;
use crate::reminders::{
    EmailReminderNotifier, PgReminderStore, ReminderJob, ReminderLinks, ReminderScheduler,
};
use crate::routes::*;
use anyhow::{anyhow, Context};
use diesel::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use rocket::{Build, Ignite, Rocket};
use rocket_sync_db_pools::database;
use secrecy::ExposeSecret;
use std::sync::Arc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[database("tracker")]
pub struct TrackerDbConn(PgConnection);

pub struct Application {
    pub server: Rocket<Ignite>,
    pub port: Port,
}

impl Application {
    pub async fn build(
        configuration: &Settings,
        email_client: Arc<dyn Email>,
    ) -> Result<Application, anyhow::Error> {
        let (port_saver, port) = port_saver::create_pair();
        let offsets = configuration
            .reminders
            .offsets()
            .map_err(|e| anyhow!(e).context("Invalid reminder offsets."))?;
        let reminder_job = ReminderJob::new(
            Arc::new(PgReminderStore::new(&configuration.database)),
            Arc::new(EmailReminderNotifier::new(
                email_client,
                ReminderLinks::from_base_url(&configuration.application.base_url),
            )),
            offsets,
        );

        let mut rocket = build_rocket(configuration)
            .attach(port_saver)
            .manage(configuration.auth.clone())
            .manage(reminder_job.clone());

        if configuration.reminders.enabled {
            let schedule = configuration
                .reminders
                .schedule()
                .map_err(|e| anyhow!(e).context("Invalid reminder schedule."))?;
            tracing::info!(?schedule, "Daily reminder sweep enabled");
            rocket = rocket.attach(ReminderScheduler::new(reminder_job, schedule));
        }

        let server = rocket
            .ignite()
            .await
            .map_err(|e| anyhow!(e.to_string()).context("Failed to ignite the server."))?;
        Ok(Application { server, port })
    }
}

fn build_rocket(configuration: &Settings) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", configuration.application.port.unwrap_or(0)))
        .merge(("address", configuration.application.host))
        .merge((
            "databases.tracker.url",
            configuration.database.connection_string().expose_secret().clone(),
        ))
        .merge(("databases.tracker.pool_size", configuration.database.pool_size));

    rocket::custom(figment)
        .attach(TrackerDbConn::fairing())
        .mount("/", routes![index, health])
        .mount(
            "/api/v1/auth",
            routes![
                auth_endpoints,
                sign_up,
                sign_in,
                current_user,
                protected,
                sign_out,
                sign_out_alias
            ],
        )
        .mount("/api/v1/users", routes![list_users, get_user, create_user])
        .mount(
            "/api/v1/subscriptions",
            routes![
                create_subscription,
                list_own_subscriptions,
                upcoming_renewals,
                list_all_subscriptions,
                list_user_subscriptions,
                get_subscription,
                update_subscription,
                cancel_subscription,
                delete_subscription
            ],
        )
        .mount("/api/v1/workflow", routes![trigger_reminders])
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized_request_credentials,
                forbidden,
                not_found,
                unprocessable_entity_to_bad_request,
                internal_error
            ],
        )
}

#[tracing::instrument(name = "Running database migrations", skip(conn))]
pub fn run_migrations(conn: &mut PgConnection) -> Result<(), anyhow::Error> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!(e))
        .context("Failed to run database migrations.")?;
    tracing::info!(applied = applied.len(), "Database schema is up to date");
    Ok(())
}
