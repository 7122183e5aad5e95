use anyhow::Context;
use diesel::{Connection, PgConnection};
use secrecy::ExposeSecret;
use std::sync::Arc;
use subtrack::configuration::get_configuration;
use subtrack::email::SesEmailClient;
use subtrack::startup::{run_migrations, Application};
use subtrack::telemetry::{get_subscriber, init_subscriber};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("subtrack".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration.")?;

    let mut conn = PgConnection::establish(configuration.database.connection_string().expose_secret())
        .context("Failed to connect to Postgres.")?;
    run_migrations(&mut conn)?;
    drop(conn);

    let email_client = SesEmailClient::from_settings(&configuration.email_client).await?;
    let application = Application::build(&configuration, Arc::new(email_client)).await?;
    application
        .server
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}
