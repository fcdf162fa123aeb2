use actix_web::error::ErrorInternalServerError;
use actix_web::http::{header, StatusCode};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::fmt;
use tracing::debug;

use crate::auth::service::Claims;
use crate::db::models::User;
use crate::error::{AppError, AuthError};
use crate::AppState;

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "session";

/// Rejection used by [`SessionUser`]: browser flows get bounced to the
/// login form instead of receiving an error page.
#[derive(Debug)]
pub struct LoginRedirect;

impl fmt::Display for LoginRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login required")
    }
}

impl ResponseError for LoginRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, "/login/"))
            .finish()
    }
}

/// The logged-in user, resolved from the session cookie. Extraction fails
/// with a 302 to `/login/` when there is no live session.
pub struct SessionUser(pub User);

impl FromRequest for SessionUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| ErrorInternalServerError("application state missing"))?;

            let cookie = req.cookie(SESSION_COOKIE).ok_or(LoginRedirect)?;

            match state.auth.session_user(cookie.value()).await {
                Ok(user) => Ok(SessionUser(user)),
                Err(e) => {
                    debug!("Session lookup failed: {}", e);
                    Err(LoginRedirect.into())
                }
            }
        })
    }
}

/// Verified bearer-token claims for the /api routes. The check is
/// stateless: signature and expiry only, no session lookup.
pub struct ApiClaims(pub Claims);

impl ApiClaims {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken.into())
    }
}

impl FromRequest for ApiClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = extract_claims(req);
        ready(result.map(ApiClaims).map_err(actix_web::Error::from))
    }
}

fn extract_claims(req: &HttpRequest) -> Result<Claims, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("application state missing".to_string()))?;

    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    // Accept the header with or without the Bearer prefix.
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);

    state.auth.verify_api_token(token)
}
