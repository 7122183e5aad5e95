use crate::domain::{NewUser, Password, UserEmail, UserName};
use crate::guards::{AdminUser, AuthenticatedUser};
use crate::models::User;
use crate::routes::{parse_id, register_user, ApiError, ApiResponse};
use crate::startup::TrackerDbConn;
use anyhow::Context;
use diesel::{ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl};
use rocket::http::Status;
use rocket::serde::json::Json;
use secrecy::Secret;

#[derive(serde::Deserialize)]
pub struct CreateUserData {
    name: String,
    email: String,
    password: Secret<String>,
}

impl TryFrom<CreateUserData> for NewUser {
    type Error = String;

    fn try_from(data: CreateUserData) -> Result<Self, Self::Error> {
        Ok(NewUser {
            name: UserName::parse(data.name)?,
            email: UserEmail::parse(data.email)?,
            password: Password::parse(data.password)?,
        })
    }
}

#[tracing::instrument(name = "Listing all users", skip(_admin, conn))]
#[get("/")]
pub async fn list_users(
    _admin: AdminUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = conn
        .run(|conn: &mut PgConnection| {
            use crate::schema::users;
            users::table
                .order(users::created_at.asc())
                .load::<User>(conn)
        })
        .await
        .context("Failed to load users.")?;
    Ok(ApiResponse::data(users))
}

#[tracing::instrument(name = "Fetching a user", skip(_user, conn))]
#[get("/<id>")]
pub async fn get_user(
    id: &str,
    _user: AuthenticatedUser,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = parse_id(id, "user")?;
    let user = conn
        .run(move |conn: &mut PgConnection| {
            use crate::schema::users;
            users::table.find(id).first::<User>(conn).optional()
        })
        .await
        .context("Failed to perform a query to look up the user.")?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(ApiResponse::data(user))
}

#[tracing::instrument(
    name = "Creating a user",
    skip(body, conn),
    fields(user_email = %body.email)
)]
#[post("/", data = "<body>")]
pub async fn create_user(
    body: Json<CreateUserData>,
    conn: TrackerDbConn,
) -> Result<(Status, Json<ApiResponse<User>>), ApiError> {
    let new_user: NewUser = body
        .into_inner()
        .try_into()
        .map_err(ApiError::ValidationError)?;
    let user = register_user(&conn, new_user)
        .await
        .map_err(|e| match e {
            ApiError::Conflict(message) => ApiError::ValidationError(message),
            e => e,
        })?;
    Ok((
        Status::Created,
        ApiResponse::with_message("User created successfully", user),
    ))
}
