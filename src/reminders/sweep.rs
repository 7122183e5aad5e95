use crate::domain::{SubscriptionStatus, UserEmail};
use crate::reminders::{day_of, evaluate, ReminderLabel, ReminderOffsets};
use crate::routes::error_chain_fmt;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DueSubscription {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub frequency: String,
    pub payment_method: String,
    pub status: SubscriptionStatus,
    pub renewal_date: NaiveDate,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

impl DueSubscription {
    fn is_eligible(&self, today: NaiveDate) -> bool {
        self.status == SubscriptionStatus::Active && self.renewal_date >= today
    }

    fn owner_contact(&self) -> Result<UserEmail, String> {
        match &self.owner_email {
            Some(email) if !email.trim().is_empty() => UserEmail::parse(email.clone()),
            _ => Err("No owner email on record.".into()),
        }
    }
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_active_renewing_on_or_after(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<DueSubscription>, anyhow::Error>;
}

#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn send_reminder(
        &self,
        recipient: &UserEmail,
        label: ReminderLabel,
        subscription: &DueSubscription,
    ) -> Result<(), anyhow::Error>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SweepReport {
    pub evaluated: usize,
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(thiserror::Error)]
pub enum SweepError {
    #[error("Failed to load subscriptions renewing on or after {date}.")]
    StoreUnavailable {
        date: NaiveDate,
        #[source]
        source: anyhow::Error,
    },
}

impl std::fmt::Debug for SweepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Nothing records which reminders went out: running the sweep twice on the
/// same day sends the matching reminders twice.
#[tracing::instrument(
    name = "Run daily reminder sweep",
    skip(store, notifier, offsets),
    fields(today = %day_of(now))
)]
pub async fn run_daily_sweep(
    now: DateTime<Utc>,
    store: &dyn SubscriptionStore,
    notifier: &dyn ReminderNotifier,
    offsets: &ReminderOffsets,
) -> Result<SweepReport, SweepError> {
    let today = day_of(now);
    let subscriptions = store
        .find_active_renewing_on_or_after(today)
        .await
        .map_err(|source| SweepError::StoreUnavailable {
            date: today,
            source,
        })?;
    tracing::info!(
        subscriptions = subscriptions.len(),
        "Loaded active subscriptions renewing on or after today"
    );

    let mut report = SweepReport::default();
    for subscription in subscriptions.iter().filter(|s| s.is_eligible(today)) {
        report.evaluated += 1;
        let label = match evaluate(subscription.renewal_date, today, offsets) {
            Some(label) => label,
            None => continue,
        };
        report.due += 1;

        let recipient = match subscription.owner_contact() {
            Ok(recipient) => recipient,
            Err(error) => {
                report.skipped += 1;
                tracing::warn!(
                    subscription_id = %subscription.id,
                    reminder = %label,
                    %error,
                    "Skipping a due reminder. \
                    The owner's contact details are missing or invalid",
                );
                continue;
            }
        };

        match notifier.send_reminder(&recipient, label, subscription).await {
            Ok(()) => {
                report.sent += 1;
                tracing::info!(
                    subscription_id = %subscription.id,
                    reminder = %label,
                    "Sent renewal reminder"
                );
            }
            Err(error) => {
                report.failed += 1;
                tracing::error!(
                    error.cause_chain = ?error,
                    subscription_id = %subscription.id,
                    reminder = %label,
                    "Failed to send renewal reminder"
                );
            }
        }
    }

    tracing::info!(
        evaluated = report.evaluated,
        due = report.due,
        sent = report.sent,
        failed = report.failed,
        skipped = report.skipped,
        "Reminder sweep completed"
    );
    Ok(report)
}

#[derive(Clone)]
pub struct ReminderJob {
    store: Arc<dyn SubscriptionStore>,
    notifier: Arc<dyn ReminderNotifier>,
    offsets: ReminderOffsets,
}

impl ReminderJob {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        notifier: Arc<dyn ReminderNotifier>,
        offsets: ReminderOffsets,
    ) -> Self {
        Self {
            store,
            notifier,
            offsets,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<SweepReport, SweepError> {
        run_daily_sweep(now, self.store.as_ref(), self.notifier.as_ref(), &self.offsets).await
    }
}
