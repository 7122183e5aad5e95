mod unauthorized;
mod unprocessable_entity;

pub use unauthorized::*;
pub use unprocessable_entity::*;

use crate::routes::ApiResponse;
use rocket::serde::json::Json;
use rocket::Request;

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<ApiResponse<()>> {
    ApiResponse::failure("Bad Request")
}

#[catch(403)]
pub fn forbidden(_req: &Request) -> Json<ApiResponse<()>> {
    ApiResponse::failure("Forbidden")
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<ApiResponse<()>> {
    ApiResponse::failure(format!("No route for {}", req.uri()))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<ApiResponse<()>> {
    ApiResponse::failure("Internal Server Error")
}
