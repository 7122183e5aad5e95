use crate::domain::{
    SubscriptionDetails, SubscriptionDraft, SubscriptionPatch, SubscriptionStatus,
};
use crate::guards::{AdminUser, AuthenticatedUser};
use crate::models::{NewSubscription, Subscription, SubscriptionChanges};
use crate::routes::{parse_id, ApiError, ApiResponse};
use crate::startup::TrackerDbConn;
use anyhow::{anyhow, Context};
use chrono::{Duration, NaiveDate, Utc};
use diesel::{ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl};
use rocket::http::Status;
use rocket::serde::json::Json;
use uuid::Uuid;

const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(serde::Deserialize)]
pub struct CreateSubscriptionData {
    name: String,
    price: f64,
    currency: Option<String>,
    frequency: String,
    category: String,
    #[serde(alias = "paymentMethod")]
    payment_method: String,
    status: Option<String>,
    #[serde(alias = "startDate")]
    start_date: NaiveDate,
    #[serde(alias = "renewalDate")]
    renewal_date: Option<NaiveDate>,
}

impl From<CreateSubscriptionData> for SubscriptionDraft {
    fn from(data: CreateSubscriptionData) -> Self {
        SubscriptionDraft {
            name: data.name,
            price: data.price,
            currency: data.currency,
            frequency: data.frequency,
            category: data.category,
            payment_method: data.payment_method,
            status: data.status,
            start_date: data.start_date,
            renewal_date: data.renewal_date,
        }
    }
}

#[derive(serde::Deserialize)]
pub struct UpdateSubscriptionData {
    name: Option<String>,
    price: Option<f64>,
    currency: Option<String>,
    frequency: Option<String>,
    category: Option<String>,
    #[serde(alias = "paymentMethod")]
    payment_method: Option<String>,
    status: Option<String>,
    #[serde(alias = "startDate")]
    start_date: Option<NaiveDate>,
    #[serde(alias = "renewalDate")]
    renewal_date: Option<NaiveDate>,
}

impl From<UpdateSubscriptionData> for SubscriptionPatch {
    fn from(data: UpdateSubscriptionData) -> Self {
        SubscriptionPatch {
            name: data.name,
            price: data.price,
            currency: data.currency,
            frequency: data.frequency,
            category: data.category,
            payment_method: data.payment_method,
            status: data.status,
            start_date: data.start_date,
            renewal_date: data.renewal_date,
        }
    }
}

#[tracing::instrument(
    name = "Adding a new subscription",
    skip(body, user, conn),
    fields(
        request_id = %Uuid::new_v4(),
        user_id = %user.user_id(),
        subscription_name = %body.name
    )
)]
#[post("/", data = "<body>")]
pub async fn create_subscription(
    body: Json<CreateSubscriptionData>,
    user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<(Status, Json<ApiResponse<Subscription>>), ApiError> {
    let today = Utc::now().date_naive();
    let details = SubscriptionDetails::create(body.into_inner().into(), today)
        .map_err(ApiError::ValidationError)?;
    let subscription = insert_subscription(&conn, user.user_id(), details).await?;
    Ok((
        Status::Created,
        ApiResponse::with_message("Subscription created successfully", subscription),
    ))
}

#[tracing::instrument(name = "Listing the caller's subscriptions", skip(user, conn), fields(user_id = %user.user_id()))]
#[get("/")]
pub async fn list_own_subscriptions(
    user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<Vec<Subscription>>>, ApiError> {
    let subscriptions = load_user_subscriptions(&conn, user.user_id()).await?;
    Ok(ApiResponse::data(subscriptions))
}

#[tracing::instrument(name = "Listing upcoming renewals", skip(user, conn), fields(user_id = %user.user_id()))]
#[get("/upcoming-renewals")]
pub async fn upcoming_renewals(
    user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<Vec<Subscription>>>, ApiError> {
    let today = Utc::now().date_naive();
    let window_end = today + Duration::days(UPCOMING_WINDOW_DAYS);
    let user_id = user.user_id();
    let subscriptions = conn
        .run(move |conn: &mut PgConnection| {
            use crate::schema::subscriptions;
            subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .filter(subscriptions::status.eq(SubscriptionStatus::Active.as_str()))
                .filter(subscriptions::renewal_date.ge(today))
                .filter(subscriptions::renewal_date.le(window_end))
                .order(subscriptions::renewal_date.asc())
                .load::<Subscription>(conn)
        })
        .await
        .context("Failed to load upcoming renewals.")?;
    Ok(ApiResponse::data(subscriptions))
}

#[tracing::instrument(name = "Listing every subscription", skip(_admin, conn))]
#[get("/all")]
pub async fn list_all_subscriptions(
    _admin: AdminUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<Vec<Subscription>>>, ApiError> {
    let subscriptions = conn
        .run(|conn: &mut PgConnection| {
            use crate::schema::subscriptions;
            subscriptions::table
                .order(subscriptions::created_at.asc())
                .load::<Subscription>(conn)
        })
        .await
        .context("Failed to load subscriptions.")?;
    Ok(ApiResponse::data(subscriptions))
}

#[tracing::instrument(name = "Listing a user's subscriptions", skip(user, conn))]
#[get("/user/<user_id>")]
pub async fn list_user_subscriptions(
    user_id: &str,
    user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<Vec<Subscription>>>, ApiError> {
    let owner_id = parse_id(user_id, "user")?;
    if !user.may_access(owner_id) {
        return Err(ApiError::Forbidden);
    }
    let subscriptions = load_user_subscriptions(&conn, owner_id).await?;
    Ok(ApiResponse::data(subscriptions))
}

#[tracing::instrument(name = "Fetching a subscription", skip(user, conn))]
#[get("/<id>")]
pub async fn get_subscription(
    id: &str,
    user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<Subscription>>, ApiError> {
    let subscription = load_accessible_subscription(&conn, id, &user).await?;
    Ok(ApiResponse::data(subscription))
}

#[tracing::instrument(name = "Updating a subscription", skip(body, user, conn))]
#[put("/<id>", data = "<body>")]
pub async fn update_subscription(
    id: &str,
    body: Json<UpdateSubscriptionData>,
    user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<Subscription>>, ApiError> {
    let stored = load_accessible_subscription(&conn, id, &user).await?;
    let details = stored
        .details()
        .map_err(|e| anyhow!(e).context("A stored subscription failed validation."))?
        .apply(body.into_inner().into(), Utc::now().date_naive())
        .map_err(ApiError::ValidationError)?;
    let subscription = save_subscription(&conn, stored.id, details).await?;
    Ok(ApiResponse::with_message(
        "Subscription updated successfully",
        subscription,
    ))
}

#[tracing::instrument(name = "Cancelling a subscription", skip(user, conn))]
#[put("/<id>/cancel")]
pub async fn cancel_subscription(
    id: &str,
    user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<Subscription>>, ApiError> {
    let stored = load_accessible_subscription(&conn, id, &user).await?;
    let subscription_id = stored.id;
    let subscription = conn
        .run(move |conn: &mut PgConnection| {
            use crate::schema::subscriptions;
            diesel::update(subscriptions::table.find(subscription_id))
                .set((
                    subscriptions::status.eq(SubscriptionStatus::Cancelled.as_str()),
                    subscriptions::updated_at.eq(Utc::now()),
                ))
                .get_result::<Subscription>(conn)
        })
        .await
        .context("Failed to cancel the subscription.")?;
    Ok(ApiResponse::with_message(
        "Subscription cancelled successfully",
        subscription,
    ))
}

#[tracing::instrument(name = "Deleting a subscription", skip(user, conn))]
#[delete("/<id>")]
pub async fn delete_subscription(
    id: &str,
    user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let stored = load_accessible_subscription(&conn, id, &user).await?;
    let subscription_id = stored.id;
    conn.run(move |conn: &mut PgConnection| {
        use crate::schema::subscriptions;
        diesel::delete(subscriptions::table.find(subscription_id)).execute(conn)
    })
    .await
    .context("Failed to delete the subscription.")?;
    Ok(ApiResponse::message("Subscription deleted successfully"))
}

/// 400 for a malformed id, 404 if missing, 403 unless the caller owns it
/// or is an admin.
async fn load_accessible_subscription(
    conn: &TrackerDbConn,
    id: &str,
    user: &AuthenticatedUser,
) -> Result<Subscription, ApiError> {
    let id = parse_id(id, "subscription")?;
    let subscription = conn
        .run(move |conn: &mut PgConnection| {
            use crate::schema::subscriptions;
            subscriptions::table
                .find(id)
                .first::<Subscription>(conn)
                .optional()
        })
        .await
        .context("Failed to perform a query to look up the subscription.")?
        .ok_or(ApiError::NotFound("Subscription not found"))?;
    if !user.may_access(subscription.user_id) {
        return Err(ApiError::Forbidden);
    }
    Ok(subscription)
}

async fn load_user_subscriptions(
    conn: &TrackerDbConn,
    user_id: Uuid,
) -> Result<Vec<Subscription>, anyhow::Error> {
    conn.run(move |conn: &mut PgConnection| {
        use crate::schema::subscriptions;
        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .order(subscriptions::created_at.asc())
            .load::<Subscription>(conn)
    })
    .await
    .context("Failed to load the user's subscriptions.")
}

#[tracing::instrument(name = "Saving new subscription details in the database", skip(conn, details))]
async fn insert_subscription(
    conn: &TrackerDbConn,
    user_id: Uuid,
    details: SubscriptionDetails,
) -> Result<Subscription, anyhow::Error> {
    conn.run(move |conn: &mut PgConnection| {
        use crate::schema::subscriptions;
        let now = Utc::now();
        diesel::insert_into(subscriptions::table)
            .values(NewSubscription {
                id: &Uuid::new_v4(),
                user_id: &user_id,
                name: details.name.as_ref(),
                price: details.price.value(),
                currency: details.currency.as_str(),
                frequency: details.frequency.as_str(),
                category: details.category.as_str(),
                payment_method: details.payment_method.as_str(),
                status: details.status.as_str(),
                start_date: &details.start_date,
                renewal_date: &details.renewal_date,
                created_at: &now,
                updated_at: &now,
            })
            .get_result::<Subscription>(conn)
    })
    .await
    .context("Failed to insert the new subscription.")
}

async fn save_subscription(
    conn: &TrackerDbConn,
    id: Uuid,
    details: SubscriptionDetails,
) -> Result<Subscription, anyhow::Error> {
    conn.run(move |conn: &mut PgConnection| {
        use crate::schema::subscriptions;
        let updated_at = Utc::now();
        diesel::update(subscriptions::table.find(id))
            .set(SubscriptionChanges::from_details(&details, &updated_at))
            .get_result::<Subscription>(conn)
    })
    .await
    .context("Failed to update the subscription.")
}
