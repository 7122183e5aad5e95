use crate::configuration::DatabaseSettings;
use crate::domain::SubscriptionStatus;
use crate::models::Subscription;
use crate::reminders::{DueSubscription, SubscriptionStore};
use crate::telemetry::spawn_blocking_with_tracing;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::PgConnection;
use secrecy::{ExposeSecret, Secret};

/// Each sweep opens its own connection and drops it once the query is done.
pub struct PgReminderStore {
    connection_string: Secret<String>,
}

impl PgReminderStore {
    pub fn new(settings: &DatabaseSettings) -> Self {
        Self {
            connection_string: settings.connection_string(),
        }
    }
}

#[async_trait]
impl SubscriptionStore for PgReminderStore {
    #[tracing::instrument(name = "Load subscriptions due for reminders", skip(self))]
    async fn find_active_renewing_on_or_after(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<DueSubscription>, anyhow::Error> {
        let connection_string = self.connection_string.clone();
        spawn_blocking_with_tracing(move || {
            let mut conn = PgConnection::establish(connection_string.expose_secret())
                .context("Failed to connect to Postgres.")?;
            load_due_subscriptions(&mut conn, date)
        })
        .await
        .context("Failed to spawn blocking task.")?
    }
}

fn load_due_subscriptions(
    conn: &mut PgConnection,
    date: NaiveDate,
) -> Result<Vec<DueSubscription>, anyhow::Error> {
    use crate::schema::{subscriptions, users};

    let rows = subscriptions::table
        .left_join(users::table)
        .filter(subscriptions::status.eq(SubscriptionStatus::Active.as_str()))
        .filter(subscriptions::renewal_date.ge(date))
        .order(subscriptions::renewal_date.asc())
        .select((
            subscriptions::all_columns,
            users::name.nullable(),
            users::email.nullable(),
        ))
        .load::<(Subscription, Option<String>, Option<String>)>(conn)
        .context("Failed to query active subscriptions.")?;

    rows.into_iter()
        .map(|(subscription, owner_name, owner_email)| {
            let status = SubscriptionStatus::parse(&subscription.status).map_err(|e| anyhow!(e))?;
            Ok(DueSubscription {
                id: subscription.id,
                name: subscription.name,
                price: subscription.price,
                currency: subscription.currency,
                frequency: subscription.frequency,
                payment_method: subscription.payment_method,
                status,
                renewal_date: subscription.renewal_date,
                owner_name,
                owner_email,
            })
        })
        .collect()
}
