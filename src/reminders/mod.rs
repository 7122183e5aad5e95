//! Renewal reminders: which offset fires today, and the daily sweep that
//! sends them.

mod evaluator;
mod notifier;
mod scheduler;
mod store;
mod sweep;

pub use evaluator::{day_of, evaluate, ReminderLabel, ReminderOffsets};
pub use notifier::{EmailReminderNotifier, ReminderEmail, ReminderLinks};
pub use scheduler::{DailySchedule, ReminderScheduler};
pub use store::PgReminderStore;
pub use sweep::{
    run_daily_sweep, DueSubscription, ReminderJob, ReminderNotifier, SubscriptionStore,
    SweepError, SweepReport,
};
