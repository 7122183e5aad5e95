use crate::guards::AuthenticatedUser;
use anyhow::anyhow;
use rocket::http::Status;
use rocket::outcome::try_outcome;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;

pub struct AdminUser(pub AuthenticatedUser);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let user = try_outcome!(request.guard::<AuthenticatedUser>().await);
        if user.is_admin() {
            Outcome::Success(AdminUser(user))
        } else {
            Outcome::Error((Status::Forbidden, anyhow!("Admin access required.")))
        }
    }
}
