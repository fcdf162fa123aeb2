use actix_web::{HttpRequest, HttpResponse};

use crate::render;

pub async fn index(req: HttpRequest) -> HttpResponse {
    let body = r#"<h1>Eventboard</h1>
<p>Plan events, register users, keep score.</p>
<ul>
<li><a href="/login/">Login</a></li>
<li><a href="/register/">Register</a></li>
<li><a href="/events/">Events</a></li>
</ul>"#;
    render::html_page(&req, "Eventboard", body)
}

/// Catch-all for unmatched routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(render::NOT_FOUND_PAGE)
}
