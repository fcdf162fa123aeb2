use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use crate::auth::SessionUser;
use crate::db::models::{Event, EventUpdate, NewEvent};
use crate::error::AppError;
use crate::events::forms::EventForm;
use crate::pagination::PageParams;
use crate::render;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

fn event_form_html(action: &str, event: Option<&Event>) -> String {
    let description = event.map(|e| render::escape(&e.description)).unwrap_or_default();
    let begin_at = event
        .map(|e| e.begin_at.to_string())
        .unwrap_or_else(|| Utc::now().date_naive().to_string());
    let end_at = event
        .map(|e| e.end_at.to_string())
        .unwrap_or_else(|| Utc::now().date_naive().to_string());
    let max_users = event.map(|e| e.max_users).unwrap_or(1);
    let checked = if event.map(|e| e.is_active).unwrap_or(true) {
        " checked"
    } else {
        ""
    };

    format!(
        r#"<form method="post" action="{action}">
<label>Description <input type="text" name="description" value="{description}"></label><br>
<label>Start Date <input type="date" name="begin_at" value="{begin_at}"></label><br>
<label>Deadline Date <input type="date" name="end_at" value="{end_at}"></label><br>
<label>Max Users <input type="number" name="max_users" value="{max_users}"></label><br>
<label>Active <input type="checkbox" name="is_active"{checked}></label><br>
<button type="submit">Save</button>
</form>"#
    )
}

fn not_found_page() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(render::NOT_FOUND_PAGE)
}

pub async fn create_event_page(_user: SessionUser, req: HttpRequest) -> HttpResponse {
    let body = format!("<h1>Create Event</h1>{}", event_form_html("/create/", None));
    render::html_page(&req, "Create Event", &body)
}

pub async fn create_event(
    user: SessionUser,
    form: web::Form<EventForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Err(e) = form.validate() {
        return Ok(render::redirect_with_flash("/create/", "danger", &e.to_string()));
    }

    let new_event = NewEvent {
        description: form.description.clone(),
        created_by: user.0.id,
        begin_at: form.begin_at,
        end_at: form.end_at,
        max_users: form.max_users,
        is_active: form.is_active(),
    };

    let event = match state.db.create_event(&new_event).await {
        Ok(event) => event,
        Err(e) => {
            error!("Event creation failed: {}", e);
            return Ok(render::redirect_with_flash("/create/", "danger", "Something wrong..."));
        }
    };

    info!("Event {} created by user {}", event.id, user.0.id);

    // The creator is registered to their own event right away.
    state
        .db
        .register_event_user(event.id, user.0.id, Utc::now().date_naive(), Some(0))
        .await?;

    Ok(render::redirect_with_flash(
        &format!("/events/{}/", event.id),
        "success",
        "Event created.",
    ))
}

pub async fn get_events(
    user: SessionUser,
    params: web::Query<PageParams>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let events = state.db.list_events(params.limit(), params.offset()).await?;
    let total = state.db.count_events().await?;

    let mut rows = String::new();
    for event in &events {
        rows.push_str(&format!(
            r#"<li><a href="/events/{}/">{}</a></li>"#,
            event.id,
            render::escape(&event.description)
        ));
    }

    let body = format!(
        r#"<h1>Events List</h1>
<p>Logged in as {}</p>
<form method="get" action="/search/"><input type="text" name="query"><button type="submit">Search</button></form>
<ul>{}</ul>
<p>{}</p>
<p><a href="/create/">Create Event</a></p>"#,
        render::escape(&user.0.full_name()),
        rows,
        render::pagination_links("/events/", params.page(), params.size(), total),
    );

    Ok(render::html_page(&req, "Events List", &body))
}

pub async fn search_event(
    _user: SessionUser,
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let Some(pattern) = params.query.as_deref().filter(|q| !q.is_empty()) else {
        return Ok(render::redirect("/events/"));
    };

    let events = state.db.search_events(pattern).await?;

    let mut rows = String::new();
    for event in &events {
        rows.push_str(&format!(
            r#"<li><a href="/events/{}/">{}</a></li>"#,
            event.id,
            render::escape(&event.description)
        ));
    }

    let body = format!("<h1>Search result</h1><ul>{}</ul>", rows);
    Ok(render::html_page(&req, "Search result", &body))
}

pub async fn get_event_by_id(
    _user: SessionUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let Some(event) = state.db.get_event_by_id(id).await? else {
        return Ok(not_found_page());
    };
    let registrations = state.db.list_event_registrations(id).await?;

    let user_ids = registrations
        .iter()
        .map(|r| r.user_id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let body = format!(
        r#"<h1>{description}</h1>
<p>From {begin_at} to {end_at}</p>
<p>Capacity: {max_users}</p>
<p>Active: {is_active}</p>
<p>Today: {today}</p>
<p>Registered users: [{user_ids}]</p>
<form method="post" action="/events/{id}/users"><button type="submit">Register</button></form>
<p><a href="/events/{id}/update/">Edit</a> | <a href="/events/{id}/users/">Participants</a></p>"#,
        description = render::escape(&event.description),
        begin_at = event.begin_at,
        end_at = event.end_at,
        max_users = event.max_users,
        is_active = event.is_active,
        today = Utc::now().date_naive(),
        user_ids = user_ids,
        id = id,
    );

    Ok(render::html_page(&req, "Event", &body))
}

pub async fn update_event_page(
    _user: SessionUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let Some(event) = state.db.get_event_by_id(id).await? else {
        return Ok(not_found_page());
    };

    let body = format!(
        "<h1>Update Event</h1>{}",
        event_form_html(&format!("/events/{}/update/", id), Some(&event))
    );
    Ok(render::html_page(&req, "Update Event", &body))
}

pub async fn update_event(
    user: SessionUser,
    path: web::Path<i64>,
    form: web::Form<EventForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if let Err(e) = form.validate() {
        return Ok(render::redirect_with_flash(
            &format!("/events/{}/update/", id),
            "danger",
            &e.to_string(),
        ));
    }

    let update = EventUpdate {
        description: Some(form.description.clone()),
        begin_at: Some(form.begin_at),
        end_at: Some(form.end_at),
        max_users: Some(form.max_users),
        is_active: Some(form.is_active()),
    };

    match state.db.update_event(id, &update).await {
        Ok(_) => {
            info!("Event {} updated by user {}", id, user.0.id);
            Ok(render::redirect_with_flash(
                &format!("/events/{}/", id),
                "success",
                "Event updated.",
            ))
        }
        Err(e) => {
            error!("Event {} update failed: {}", id, e);
            Ok(render::redirect_with_flash(
                &format!("/events/{}/update/", id),
                "danger",
                "An error occurred",
            ))
        }
    }
}

pub async fn get_users_by_event_id(
    _user: SessionUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let registrations = state.db.list_event_registrations(id).await?;

    let mut rows = String::new();
    for registration in &registrations {
        rows.push_str(&format!(
            "<li>{} ({})</li>",
            render::escape(&registration.username),
            registration.user_id
        ));
    }

    let body = format!("<h1>Event {} users</h1><ul>{}</ul>", id, rows);
    Ok(render::html_page(&req, "Event users", &body))
}

pub async fn bind_user_by_event_id(
    user: SessionUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    match state
        .db
        .register_event_user(id, user.0.id, Utc::now().date_naive(), Some(0))
        .await
    {
        Ok(_) => {
            info!("User {} bound to event {}", user.0.id, id);
            Ok(render::redirect_with_flash(
                &format!("/events/{}/users/", id),
                "success",
                "User bound.",
            ))
        }
        Err(e) => {
            error!("Binding user {} to event {} failed: {}", user.0.id, id, e);
            Ok(render::redirect_with_flash(
                &format!("/events/{}/", id),
                "danger",
                "Something went wrong...",
            ))
        }
    }
}
