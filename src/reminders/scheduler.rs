use crate::reminders::ReminderJob;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket, Shutdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    run_at: NaiveTime,
}

impl DailySchedule {
    pub fn at(hour: u32, minute: u32) -> Result<DailySchedule, String> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(|run_at| Self { run_at })
            .ok_or_else(|| format!("{:02}:{:02} is not a valid time of day.", hour, minute))
    }

    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = Utc.from_utc_datetime(&now.naive_utc().date().and_time(self.run_at));
        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }

    /// Never schedules the same day twice, even when the wall clock still
    /// reads earlier than `previous_run`.
    pub fn run_following(
        &self,
        previous_run: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        self.next_run_after(previous_run.max(now))
    }
}

/// Runs the reminder sweep once a day until Rocket shuts down.
pub struct ReminderScheduler {
    job: ReminderJob,
    schedule: DailySchedule,
}

impl ReminderScheduler {
    pub fn new(job: ReminderJob, schedule: DailySchedule) -> Self {
        Self { job, schedule }
    }
}

#[rocket::async_trait]
impl Fairing for ReminderScheduler {
    fn info(&self) -> Info {
        Info {
            name: "Daily Reminder Scheduler",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        tokio::spawn(run_schedule(
            self.job.clone(),
            self.schedule,
            rocket.shutdown(),
        ));
    }
}

async fn run_schedule(job: ReminderJob, schedule: DailySchedule, shutdown: Shutdown) {
    tokio::pin!(shutdown);
    let mut next_run = schedule.next_run_after(Utc::now());
    loop {
        let wait = (next_run - Utc::now()).to_std().unwrap_or_default();
        tracing::info!(next_run = %next_run, "Waiting for the next reminder sweep");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = &mut shutdown => {
                tracing::info!("Stopping the reminder scheduler");
                return;
            }
        }

        match job.run(next_run.max(Utc::now())).await {
            Ok(report) => tracing::info!(?report, "Daily reminder sweep finished"),
            Err(error) => tracing::error!(
                error.cause_chain = ?error,
                "Daily reminder sweep aborted"
            ),
        }
        next_run = schedule.run_following(next_run, Utc::now());
    }
}
