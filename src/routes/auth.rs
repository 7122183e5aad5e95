use crate::authentication::{generate_session_token, hash_password, verify_password, AuthError};
use crate::configuration::AuthSettings;
use crate::domain::{NewUser, Password, Role, UserEmail, UserName};
use crate::guards::{AuthenticatedUser, BearerToken};
use crate::models::{NewSession, NewUserRecord, User};
use crate::routes::{ApiError, ApiResponse};
use crate::startup::TrackerDbConn;
use anyhow::Context;
use chrono::Utc;
use diesel::{ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct SignUpData {
    name: String,
    email: String,
    password: Secret<String>,
}

#[derive(serde::Deserialize)]
pub struct SignInData {
    email: String,
    password: Secret<String>,
}

#[derive(serde::Serialize)]
pub struct SessionData {
    token: String,
    user: User,
}

#[derive(serde::Serialize)]
pub struct AuthEndpoints {
    endpoints: Vec<&'static str>,
}

impl TryFrom<SignUpData> for NewUser {
    type Error = String;

    fn try_from(data: SignUpData) -> Result<Self, Self::Error> {
        let name = UserName::parse(data.name)?;
        let email = UserEmail::parse(data.email)?;
        let password = Password::parse(data.password)?;
        Ok(NewUser {
            name,
            email,
            password,
        })
    }
}

#[get("/")]
pub fn auth_endpoints() -> Json<ApiResponse<AuthEndpoints>> {
    ApiResponse::with_message(
        "Auth endpoints available",
        AuthEndpoints {
            endpoints: vec!["/sign-up", "/sign-in", "/sign-out", "/me"],
        },
    )
}

#[tracing::instrument(
    name = "Signing up a new user",
    skip(body, conn, auth_settings),
    fields(user_email = %body.email)
)]
#[post("/sign-up", data = "<body>")]
pub async fn sign_up(
    body: Json<SignUpData>,
    conn: TrackerDbConn,
    auth_settings: &State<AuthSettings>,
) -> Result<(Status, Json<ApiResponse<SessionData>>), ApiError> {
    let new_user: NewUser = body
        .into_inner()
        .try_into()
        .map_err(ApiError::ValidationError)?;
    let user = register_user(&conn, new_user).await?;
    let token = start_session(&conn, user.user_id, auth_settings).await?;
    Ok((
        Status::Created,
        ApiResponse::with_message("User created successfully", SessionData { token, user }),
    ))
}

#[tracing::instrument(
    name = "Signing in a user",
    skip(body, conn, auth_settings),
    fields(user_email = %body.email)
)]
#[post("/sign-in", data = "<body>")]
pub async fn sign_in(
    body: Json<SignInData>,
    conn: TrackerDbConn,
    auth_settings: &State<AuthSettings>,
) -> Result<Json<ApiResponse<SessionData>>, ApiError> {
    let SignInData { email, password } = body.into_inner();
    let email = email.trim().to_lowercase();
    let user = find_user_by_email(&conn, email)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    verify_password(Secret::new(user.password_hash.clone()), password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials(_) => ApiError::Unauthorized(e.to_string()),
            AuthError::UnexpectedError(_) => ApiError::UnexpectedError(e.into()),
        })?;

    let token = start_session(&conn, user.user_id, auth_settings).await?;
    Ok(ApiResponse::with_message(
        "User signed in successfully",
        SessionData { token, user },
    ))
}

#[tracing::instrument(name = "Fetching the current user", skip(user), fields(user_id = %user.user_id()))]
#[get("/me")]
pub fn current_user(user: AuthenticatedUser) -> Json<ApiResponse<User>> {
    ApiResponse::data(user.user)
}

#[derive(serde::Serialize)]
pub struct ProtectedData {
    message: &'static str,
    user: User,
}

#[get("/protected")]
pub fn protected(user: AuthenticatedUser) -> Json<ProtectedData> {
    Json(ProtectedData {
        message: "You are authorized",
        user: user.user,
    })
}

#[tracing::instrument(name = "Signing out", skip(token, conn))]
#[post("/sign-out")]
pub async fn sign_out(
    token: Result<BearerToken, anyhow::Error>,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    sign_out_session(token, conn).await
}

#[post("/signout")]
pub async fn sign_out_alias(
    token: Result<BearerToken, anyhow::Error>,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    sign_out_session(token, conn).await
}

async fn sign_out_session(
    token: Result<BearerToken, anyhow::Error>,
    conn: TrackerDbConn,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let token = token.map_err(|_| ApiError::ValidationError("No token provided".into()))?;
    let token = token.as_str().to_string();
    let revoked = conn
        .run(move |conn: &mut PgConnection| {
            use crate::schema::sessions;
            diesel::update(
                sessions::table
                    .filter(sessions::token.eq(&token))
                    .filter(sessions::revoked_at.is_null()),
            )
            .set(sessions::revoked_at.eq(Some(Utc::now())))
            .execute(conn)
        })
        .await
        .context("Failed to revoke the session.")?;
    if revoked == 0 {
        return Err(ApiError::ValidationError("Invalid token".into()));
    }
    Ok(ApiResponse::message("User signed out successfully"))
}

#[tracing::instrument(name = "Saving new user details in the database", skip(conn, new_user))]
pub async fn register_user(conn: &TrackerDbConn, new_user: NewUser) -> Result<User, ApiError> {
    let NewUser {
        name,
        email,
        password,
    } = new_user;
    let email = email.as_ref().to_string();
    if find_user_by_email(conn, email.clone()).await?.is_some() {
        return Err(ApiError::Conflict("User already exists.".into()));
    }

    let password_hash = hash_password(password.into_secret()).await?;
    let name = name.as_ref().to_string();
    let user = conn
        .run(move |conn: &mut PgConnection| {
            use crate::schema::users;
            diesel::insert_into(users::table)
                .values(NewUserRecord {
                    user_id: &Uuid::new_v4(),
                    name: &name,
                    email: &email,
                    password_hash: password_hash.expose_secret(),
                    role: Role::User.as_str(),
                    created_at: &Utc::now(),
                })
                .get_result::<User>(conn)
        })
        .await
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => ApiError::Conflict("User already exists.".into()),
            e => ApiError::UnexpectedError(
                anyhow::Error::new(e).context("Failed to insert the new user."),
            ),
        })?;
    Ok(user)
}

#[tracing::instrument(name = "Get user by email", skip(conn))]
async fn find_user_by_email(
    conn: &TrackerDbConn,
    email: String,
) -> Result<Option<User>, anyhow::Error> {
    conn.run(move |conn: &mut PgConnection| {
        use crate::schema::users;
        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()
    })
    .await
    .context("Failed to perform a query to look up the user.")
}

#[tracing::instrument(name = "Start a new session", skip(conn, auth_settings))]
async fn start_session(
    conn: &TrackerDbConn,
    user_id: Uuid,
    auth_settings: &AuthSettings,
) -> Result<String, anyhow::Error> {
    let token = generate_session_token();
    let created_at = Utc::now();
    let expires_at = created_at + auth_settings.session_ttl();
    let session_token = token.clone();
    conn.run(move |conn: &mut PgConnection| {
        use crate::schema::sessions;
        diesel::insert_into(sessions::table)
            .values(NewSession {
                token: &session_token,
                user_id: &user_id,
                created_at: &created_at,
                expires_at: &expires_at,
            })
            .execute(conn)
    })
    .await
    .context("Failed to store the new session.")?;
    Ok(token)
}
