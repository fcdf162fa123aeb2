use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::auth::ApiClaims;
use crate::db::models::{NewUser, UserUpdate};
use crate::error::AppError;
use crate::pagination::PageParams;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

pub async fn list_users(
    _claims: ApiClaims,
    params: web::Query<PageParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let users = state.db.list_users(params.limit(), params.offset()).await?;
    Ok(HttpResponse::Ok().json(users))
}

pub async fn create_user(
    _claims: ApiClaims,
    payload: web::Json<CreateUserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if payload.username.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Username and password are required".to_string(),
        ));
    }

    let new_user = NewUser {
        first_name: payload.first_name.clone(),
        last_name: payload.last_name.clone(),
        username: payload.username.clone(),
        password_hash: state.auth.hash_password(&payload.password)?,
    };

    let user = state.db.create_user(&new_user).await?;
    info!("User {} created via API", user.id);

    Ok(HttpResponse::Created().json(user))
}

pub async fn replace_user(
    _claims: ApiClaims,
    path: web::Path<i64>,
    payload: web::Json<ReplaceUserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(state.auth.hash_password(password)?),
        None => None,
    };

    let update = UserUpdate {
        first_name: Some(payload.first_name.clone()),
        last_name: Some(payload.last_name.clone()),
        username: Some(payload.username.clone()),
        password_hash,
    };

    let user = state.db.update_user(path.into_inner(), &update).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn patch_user(
    _claims: ApiClaims,
    path: web::Path<i64>,
    payload: web::Json<PatchUserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(state.auth.hash_password(password)?),
        None => None,
    };

    let update = UserUpdate {
        first_name: payload.first_name.clone(),
        last_name: payload.last_name.clone(),
        username: payload.username.clone(),
        password_hash,
    };

    let user = state.db.update_user(path.into_inner(), &update).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn delete_user(
    _claims: ApiClaims,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let deleted = state.db.delete_user(id).await?;
    if deleted > 0 {
        info!("User {} deleted via API", id);
    }

    Ok(HttpResponse::NoContent().finish())
}
