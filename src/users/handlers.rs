use actix_web::{web, HttpRequest, HttpResponse};
use tracing::{error, info};

use crate::auth::SessionUser;
use crate::db::models::NewUser;
use crate::error::{AppError, DatabaseError};
use crate::pagination::PageParams;
use crate::render;
use crate::users::forms::UserForm;
use crate::AppState;

pub async fn get_users(
    _user: SessionUser,
    params: web::Query<PageParams>,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let users = state.db.list_users(params.limit(), params.offset()).await?;
    let total = state.db.count_users().await?;

    let mut rows = String::new();
    for user in &users {
        rows.push_str(&format!(
            "<li>{} ({})</li>",
            render::escape(&user.username),
            user.id
        ));
    }

    let body = format!(
        "<h1>Users</h1><ul>{}</ul><p>{}</p>",
        rows,
        render::pagination_links("/users/", params.page(), params.size(), total),
    );

    Ok(render::html_page(&req, "Users", &body))
}

pub async fn register_page(req: HttpRequest) -> HttpResponse {
    let body = r#"<h1>Register</h1>
<form method="post" action="/register/">
<label>First Name <input type="text" name="first_name"></label><br>
<label>Last Name <input type="text" name="last_name"></label><br>
<label>Username <input type="text" name="username"></label><br>
<label>Password <input type="password" name="password"></label><br>
<button type="submit">Register</button>
</form>"#;
    render::html_page(&req, "Register", body)
}

pub async fn register(
    form: web::Form<UserForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Err(e) = form.validate() {
        return Ok(render::redirect_with_flash("/register/", "danger", &e.to_string()));
    }

    let new_user = NewUser {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        username: form.username.clone(),
        password_hash: state.auth.hash_password(&form.password)?,
    };

    match state.db.create_user(&new_user).await {
        Ok(user) => {
            info!("User {} registered with username: {}", user.id, user.username);
            Ok(render::redirect_with_flash(
                "/login/",
                "success",
                "User registered. Please, log in.",
            ))
        }
        Err(AppError::DatabaseError(DatabaseError::Duplicate)) => {
            Ok(render::redirect_with_flash(
                "/register/",
                "danger",
                "Username already in use.",
            ))
        }
        Err(e) => {
            error!("Registration failed for username {}: {}", form.username, e);
            Err(e)
        }
    }
}
