use crate::guards::AdminUser;
use crate::reminders::{ReminderJob, SweepReport};
use crate::routes::{ApiError, ApiResponse};
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;

/// Reminders already sent today by the scheduler will be sent again.
#[tracing::instrument(name = "Triggering the reminder sweep", skip(admin, job), fields(admin_id = %admin.0.user_id()))]
#[post("/reminders")]
pub async fn trigger_reminders(
    admin: AdminUser,
    job: &State<ReminderJob>,
) -> Result<Json<ApiResponse<SweepReport>>, ApiError> {
    let report = job
        .run(Utc::now())
        .await
        .map_err(|e| ApiError::UnexpectedError(e.into()))?;
    Ok(ApiResponse::with_message("Reminder sweep completed", report))
}
