use crate::guards::OrStatus;
use anyhow::anyhow;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;

/// Raw token from an `Authorization: Bearer <token>` header.
///
/// Only the header shape is checked here; see `AuthenticatedUser` for the
/// session lookup.
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BearerToken {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match from_request_result(request) {
            Ok(token) => Outcome::Success(token),
            Err(failure) => Outcome::Error(failure),
        }
    }
}

fn from_request_result(request: &Request) -> Result<BearerToken, (Status, anyhow::Error)> {
    let header_value = request
        .headers()
        .get_one("Authorization")
        .or_status(Status::Unauthorized, "The 'Authorization' header was missing.")?;

    let token = header_value
        .strip_prefix("Bearer ")
        .or_status(
            Status::Unauthorized,
            "The authorization scheme was not 'Bearer'.",
        )?
        .trim();

    if token.is_empty() {
        return Err((Status::Unauthorized, anyhow!("The bearer token was empty.")));
    }
    Ok(BearerToken(token.to_string()))
}
