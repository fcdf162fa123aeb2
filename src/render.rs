//! Minimal HTML assembly for the browser-facing views, plus the flash
//! message and redirect helpers shared by the page handlers.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};

/// Name of the cookie carrying a one-shot flash message across a redirect.
pub const FLASH_COOKIE: &str = "flash";

/// Body of the generic 404 page.
pub const NOT_FOUND_PAGE: &str = "<h1>Looks like you're lost</h1>";

/// Body of the generic 500 page.
pub const INTERNAL_ERROR_PAGE: &str = "<h1>My bad...</h1>";

/// Escape text for interpolation into HTML element content or attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flash: Option<&(String, String)>, body: &str) -> String {
    let flash_html = match flash {
        Some((level, message)) => format!(
            r#"<div class="flash flash-{}">{}</div>"#,
            escape(level),
            escape(message)
        ),
        None => String::new(),
    };

    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav><a href="/">Home</a> | <a href="/events/">Events</a> | <a href="/users/">Users</a> | <a href="/logout/">Logout</a></nav>
{flash_html}
{body}
</body>
</html>
"#,
        title = escape(title),
        flash_html = flash_html,
        body = body,
    )
}

/// Render a full page, consuming any pending flash message.
pub fn html_page(req: &HttpRequest, title: &str, body: &str) -> HttpResponse {
    let flash = take_flash(req);
    let html = layout(title, flash.as_ref(), body);

    let mut builder = HttpResponse::Ok();
    builder.content_type("text/html; charset=utf-8");
    if flash.is_some() {
        let mut removal = Cookie::new(FLASH_COOKIE, "");
        removal.set_path("/");
        removal.make_removal();
        builder.cookie(removal);
    }
    builder.body(html)
}

/// Read the pending flash message, if any, as (level, message).
pub fn take_flash(req: &HttpRequest) -> Option<(String, String)> {
    let cookie = req.cookie(FLASH_COOKIE)?;
    let value = cookie.value();
    let (level, message) = value.split_once(':')?;
    let message = urlencoding::decode(message).ok()?.into_owned();
    Some((level.to_string(), message))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Redirect and carry a one-shot flash message for the next rendered page.
pub fn redirect_with_flash(location: &str, level: &str, message: &str) -> HttpResponse {
    let mut cookie = Cookie::new(
        FLASH_COOKIE,
        format!("{}:{}", level, urlencoding::encode(message)),
    );
    cookie.set_path("/");

    HttpResponse::Found()
        .cookie(cookie)
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Prev/next links for the paginated list views.
pub fn pagination_links(base: &str, page: i64, size: i64, total: i64) -> String {
    let pages = if size > 0 { (total + size - 1) / size } else { 1 };
    let mut out = String::new();

    if page > 1 {
        out.push_str(&format!(
            r#"<a href="{}?page={}&size={}">Previous</a> "#,
            base,
            page - 1,
            size
        ));
    }
    out.push_str(&format!("Page {} of {}", page, pages.max(1)));
    if page < pages {
        out.push_str(&format!(
            r#" <a href="{}?page={}&size={}">Next</a>"#,
            base,
            page + 1,
            size
        ));
    }
    out
}
