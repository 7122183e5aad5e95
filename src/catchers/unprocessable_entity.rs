use crate::routes::ApiResponse;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::Request;

/// Malformed JSON bodies are reported as 400, like any other invalid input.
#[catch(422)]
pub fn unprocessable_entity_to_bad_request(_req: &Request) -> (Status, Json<ApiResponse<()>>) {
    (
        Status::BadRequest,
        ApiResponse::failure("Request body is missing fields or is not valid JSON."),
    )
}
