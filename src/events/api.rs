use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::auth::ApiClaims;
use crate::db::models::{EventUpdate, NewEvent};
use crate::error::AppError;
use crate::pagination::PageParams;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub description: String,
    pub begin_at: NaiveDate,
    pub end_at: NaiveDate,
    pub max_users: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub description: Option<String>,
    pub begin_at: Option<NaiveDate>,
    pub end_at: Option<NaiveDate>,
    pub max_users: Option<i32>,
    pub is_active: Option<bool>,
}

pub async fn list_events(
    _claims: ApiClaims,
    params: web::Query<PageParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let events = state.db.list_events(params.limit(), params.offset()).await?;
    Ok(HttpResponse::Ok().json(events))
}

pub async fn create_event(
    claims: ApiClaims,
    payload: web::Json<CreateEventRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if payload.description.trim().is_empty() {
        return Err(AppError::ValidationError("Description is required".to_string()));
    }
    if payload.max_users < 1 {
        return Err(AppError::ValidationError(
            "Max users must be at least 1".to_string(),
        ));
    }

    let new_event = NewEvent {
        description: payload.description.clone(),
        created_by: claims.user_id()?,
        begin_at: payload.begin_at,
        end_at: payload.end_at,
        max_users: payload.max_users,
        is_active: payload.is_active,
    };

    let event = state.db.create_event(&new_event).await?;
    info!("Event {} created via API", event.id);

    Ok(HttpResponse::Created().json(event))
}

pub async fn update_event(
    _claims: ApiClaims,
    path: web::Path<i64>,
    payload: web::Json<UpdateEventRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let update = EventUpdate {
        description: payload.description.clone(),
        begin_at: payload.begin_at,
        end_at: payload.end_at,
        max_users: payload.max_users,
        is_active: payload.is_active,
    };

    let event = state.db.update_event(id, &update).await?;
    Ok(HttpResponse::Ok().json(event))
}

pub async fn delete_event(
    _claims: ApiClaims,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let deleted = state.db.delete_event(id).await?;
    if deleted > 0 {
        info!("Event {} deleted via API", id);
    }

    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_event_registrations(
    _claims: ApiClaims,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let registrations = state.db.list_event_registrations(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(registrations))
}
