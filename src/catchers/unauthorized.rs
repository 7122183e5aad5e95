use crate::routes::ApiResponse;
use rocket::http::Header;
use rocket::serde::json::Json;

#[catch(401)]
pub fn unauthorized_request_credentials() -> RequestBearerAuth {
    RequestBearerAuth::new()
}

struct RequestBearerAuthHeader;

impl<'h> From<RequestBearerAuthHeader> for Header<'h> {
    fn from(_: RequestBearerAuthHeader) -> Self {
        Header::new("WWW-Authenticate", r#"Bearer realm="subtrack""#)
    }
}

#[derive(Responder)]
#[response(status = 401, content_type = "json")]
pub struct RequestBearerAuth {
    inner: Json<ApiResponse<()>>,
    bearer_auth: RequestBearerAuthHeader,
}

impl RequestBearerAuth {
    fn new() -> RequestBearerAuth {
        RequestBearerAuth {
            inner: ApiResponse::failure("Invalid or expired token."),
            bearer_auth: RequestBearerAuthHeader,
        }
    }
}

impl Default for RequestBearerAuth {
    fn default() -> Self {
        Self::new()
    }
}
