//! Database-backed tests for event CRUD over the JSON API and the
//! membership binding flow. Skipped when DATABASE_URL is not set.

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use eventboard_server::{routes, AppState, Settings};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

async fn try_state() -> Option<web::Data<AppState>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let mut config = Settings::new_for_test().expect("Failed to load test config");
    config.database.url = url;
    Some(web::Data::new(AppState::with_pool(config, pool)))
}

fn unique_username() -> String {
    format!("user_{}", Uuid::new_v4().simple())
}

async fn register_user<S>(app: &S, username: &str)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let resp = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/register/")
            .set_form([
                ("first_name", "Test"),
                ("last_name", "User"),
                ("username", username),
                ("password", "password123"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

async fn api_token<S>(app: &S, username: &str) -> String
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let resp = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({"username": username, "password": "password123"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["token"].as_str().expect("token in response").to_string()
}

async fn login_session<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let resp = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/login/")
            .set_form([("username", username), ("password", "password123")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    resp.response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned()
}

#[actix_web::test]
async fn test_event_crud_via_api() {
    let Some(state) = try_state().await else { return };
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    let username = unique_username();
    register_user(&app, &username).await;
    let token = api_token(&app, &username).await;
    let bearer = format!("Bearer {}", token);

    // Create
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/events/")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({
                "description": format!("api event {}", username),
                "begin_at": "2024-04-01",
                "end_at": "2024-04-03",
                "max_users": 5
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let event: serde_json::Value = test::read_body_json(resp).await;
    let id = event["id"].as_i64().expect("event id");
    assert_eq!(event["max_users"], 5);
    assert_eq!(event["is_active"], true);

    // List contains it
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/events/?size=100")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Partial update
    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/events/{}/", id))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({"description": "renamed", "is_active": false}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let event: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(event["description"], "renamed");
    assert_eq!(event["is_active"], false);
    assert_eq!(event["max_users"], 5, "untouched fields survive a PATCH");

    // Delete
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/events/{}/", id))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Updating a deleted event is a 404
    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/events/{}/", id))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({"description": "ghost"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_api_login_rejects_bad_credentials() {
    let Some(state) = try_state().await else { return };
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({"username": unique_username(), "password": "nope"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_event_binding_and_duplicate_registration() {
    let Some(state) = try_state().await else { return };
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    // Creator makes an event through the form and is auto-registered
    let creator = unique_username();
    register_user(&app, &creator).await;
    let creator_session = login_session(&app, &creator).await;

    let description = format!("bind test {}", creator);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/create/")
            .cookie(creator_session.clone())
            .set_form([
                ("description", description.as_str()),
                ("begin_at", "2024-04-01"),
                ("end_at", "2024-04-03"),
                ("max_users", "5"),
                ("is_active", "on"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let id: i64 = location
        .trim_start_matches("/events/")
        .trim_end_matches('/')
        .parse()
        .expect("event id in redirect");

    // A second user can bind once
    let other = unique_username();
    register_user(&app, &other).await;
    let other_session = login_session(&app, &other).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/events/{}/users", id))
            .cookie(other_session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        format!("/events/{}/users/", id).as_str()
    );

    // Binding again trips the uniqueness constraint and flashes an error
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/events/{}/users", id))
            .cookie(other_session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let flash = resp
        .response()
        .cookies()
        .find(|c| c.name() == "flash")
        .expect("duplicate binding should flash");
    assert!(flash.value().starts_with("danger:"));

    // Both users show up exactly once in the registrations API
    let token = api_token(&app, &creator).await;
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/events/{}/users/", id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let registrations: serde_json::Value = test::read_body_json(resp).await;
    let names: Vec<&str> = registrations
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["username"].as_str().unwrap())
        .collect();
    assert_eq!(names.iter().filter(|n| **n == creator).count(), 1);
    assert_eq!(names.iter().filter(|n| **n == other).count(), 1);
}
