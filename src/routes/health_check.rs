use rocket::response::content::RawHtml;

#[get("/")]
pub fn index() -> RawHtml<&'static str> {
    RawHtml("<h1>Welcome to the subscription tracker API.</h1>")
}

#[get("/health_check")]
pub fn health() {}
