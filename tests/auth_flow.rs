//! Database-backed tests for the browser login flow. These run against
//! the database in DATABASE_URL and skip when none is configured.

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use eventboard_server::{routes, AppState, Settings};
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

fn session_cookie(resp: &actix_web::dev::ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(|c| c.into_owned())
}

#[actix_web::test]
async fn test_register_login_logout_flow() {
    let Some(state) = try_state().await else { return };
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;
    let username = unique_username();

    // Register
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/register/")
            .set_form([
                ("first_name", "Test"),
                ("last_name", "User"),
                ("username", username.as_str()),
                ("password", "password123"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login/");

    // Login
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login/")
            .set_form([("username", username.as_str()), ("password", "password123")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/events/");
    let session = session_cookie(&resp).expect("login should set a session cookie");

    // The session cookie opens the gated pages
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/events/")
            .cookie(session.clone())
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("Events List"));

    // Logout invalidates it server-side
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/logout/")
            .cookie(session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login/");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/events/")
            .cookie(session)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login/");
}

#[actix_web::test]
async fn test_duplicate_username_is_rejected() {
    let Some(state) = try_state().await else { return };
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;
    let username = unique_username();

    let form = [
        ("first_name", "Test"),
        ("last_name", "User"),
        ("username", username.as_str()),
        ("password", "password123"),
    ];

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/register/").set_form(form).to_request(),
    )
    .await;
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login/");

    // Same username again: bounced back to the form with a flash message
    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/register/").set_form(form).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/register/");
    let flash = resp
        .response()
        .cookies()
        .find(|c| c.name() == "flash")
        .expect("duplicate registration should flash");
    assert!(flash.value().starts_with("danger:"));
}

#[actix_web::test]
async fn test_wrong_password_is_rejected() {
    let Some(state) = try_state().await else { return };
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;
    let username = unique_username();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/register/")
            .set_form([
                ("first_name", "Test"),
                ("last_name", "User"),
                ("username", username.as_str()),
                ("password", "password123"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login/")
            .set_form([("username", username.as_str()), ("password", "wrong")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login/");
    assert!(session_cookie(&resp).is_none());
}
