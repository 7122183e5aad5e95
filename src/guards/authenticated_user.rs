use crate::domain::Role;
use crate::guards::BearerToken;
use crate::models::User;
use crate::startup::TrackerDbConn;
use anyhow::{anyhow, Context};
use chrono::Utc;
use diesel::{ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl};
use rocket::http::Status;
use rocket::outcome::try_outcome;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use uuid::Uuid;

pub struct AuthenticatedUser {
    pub user: User,
    // prevents construction outside of this module
    _private: (),
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> Uuid {
        self.user.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.user.role() == Role::Admin
    }

    /// Owners see their own records, admins see everything.
    pub fn may_access(&self, owner_id: Uuid) -> bool {
        self.user_id() == owner_id || self.is_admin()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = try_outcome!(request.guard::<BearerToken>().await);
        let conn = match request.guard::<TrackerDbConn>().await {
            Outcome::Success(conn) => conn,
            _ => {
                return Outcome::Error((
                    Status::InternalServerError,
                    anyhow!("Failed to retrieve a connection from the DB pool."),
                ))
            }
        };

        match find_session_user(conn, token).await {
            Ok(Some(user)) => Outcome::Success(user),
            Ok(None) => Outcome::Error((
                Status::Unauthorized,
                anyhow!("Invalid or expired token."),
            )),
            Err(e) => Outcome::Error((Status::InternalServerError, e)),
        }
    }
}

#[tracing::instrument(name = "Look up the session behind a bearer token", skip(conn, token))]
async fn find_session_user(
    conn: TrackerDbConn,
    token: BearerToken,
) -> Result<Option<AuthenticatedUser>, anyhow::Error> {
    conn.run(move |conn: &mut PgConnection| {
        use crate::schema::{sessions, users};

        let user = sessions::table
            .inner_join(users::table)
            .filter(sessions::token.eq(token.as_str()))
            .filter(sessions::revoked_at.is_null())
            .filter(sessions::expires_at.gt(Utc::now()))
            .select(users::all_columns)
            .first::<User>(conn)
            .optional()
            .context("Failed to perform a query to validate the session token.")?;

        Ok(user.map(|user| AuthenticatedUser {
            user,
            _private: (),
        }))
    })
    .await
}
