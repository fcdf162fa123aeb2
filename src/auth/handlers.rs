use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::SESSION_COOKIE;
use crate::error::AppError;
use crate::render;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

pub async fn login_page(req: HttpRequest) -> HttpResponse {
    let body = r#"<h1>Login</h1>
<form method="post" action="/login/">
<label>Username <input type="text" name="username"></label><br>
<label>Password <input type="password" name="password"></label><br>
<button type="submit">Login</button>
</form>
<p><a href="/register/">Register</a></p>"#;
    render::html_page(&req, "Login", body)
}

/// Authentication by password; opens a server-side session and points the
/// browser at the events list.
pub async fn login(
    form: web::Form<LoginForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    match state.auth.login(&form.username, &form.password).await {
        Ok((user, session)) => {
            info!("Login successful for username: {}", user.username);

            let mut cookie = Cookie::new(SESSION_COOKIE, session.token.clone());
            cookie.set_path("/");
            cookie.set_http_only(true);

            Ok(HttpResponse::Found()
                .cookie(cookie)
                .insert_header((header::LOCATION, "/events/"))
                .finish())
        }
        Err(e) => {
            info!("Login failed for username {}: {}", form.username, e);
            Ok(render::redirect_with_flash(
                "/login/",
                "danger",
                "Invalid username or password",
            ))
        }
    }
}

pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if let Err(e) = state.auth.logout(cookie.value()).await {
            error!("Failed to remove session: {}", e);
        }
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.make_removal();

    Ok(HttpResponse::Found()
        .cookie(removal)
        .insert_header((header::LOCATION, "/login/"))
        .finish())
}

/// Create a bearer token for the /api routes.
pub async fn api_login(
    payload: web::Json<ApiLoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = state
        .auth
        .issue_api_token(&payload.username, &payload.password)
        .await?;

    info!("API token issued for username: {}", payload.username);
    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}
