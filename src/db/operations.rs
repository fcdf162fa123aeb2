use sqlx::PgPool;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::db::models::{
    Event, EventRegistration, EventUpdate, EventUser, NewEvent, NewUser, User, UserSession,
    UserUpdate,
};
use crate::error::AppError;

#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    // --- users ---

    pub async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, username, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, username, password_hash, created_at
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, username, password_hash, created_at FROM users ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(users)
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count.0)
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                username = COALESCE($4, username),
                password_hash = COALESCE($5, password_hash)
            WHERE id = $1
            RETURNING id, first_name, last_name, username, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.username)
        .bind(&update.password_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn delete_user(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    // --- events ---

    pub async fn create_event(&self, event: &NewEvent) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (description, created_by, begin_at, end_at, max_users, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, description, created_by, begin_at, end_at, max_users, is_active, created_at, updated_at
            "#,
        )
        .bind(&event.description)
        .bind(event.created_by)
        .bind(event.begin_at)
        .bind(event.end_at)
        .bind(event.max_users)
        .bind(event.is_active)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(event)
    }

    pub async fn get_event_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, description, created_by, begin_at, end_at, max_users, is_active, created_at, updated_at FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(event)
    }

    pub async fn list_events(&self, limit: i64, offset: i64) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, description, created_by, begin_at, end_at, max_users, is_active, created_at, updated_at FROM events ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(events)
    }

    pub async fn count_events(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count.0)
    }

    /// Exact-match search on the event description.
    pub async fn search_events(&self, description: &str) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, description, created_by, begin_at, end_at, max_users, is_active, created_at, updated_at FROM events WHERE description = $1 ORDER BY id ASC",
        )
        .bind(description)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(events)
    }

    pub async fn update_event(&self, id: i64, update: &EventUpdate) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET description = COALESCE($2, description),
                begin_at = COALESCE($3, begin_at),
                end_at = COALESCE($4, end_at),
                max_users = COALESCE($5, max_users),
                is_active = COALESCE($6, is_active),
                updated_at = $7
            WHERE id = $1
            RETURNING id, description, created_by, begin_at, end_at, max_users, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.description)
        .bind(update.begin_at)
        .bind(update.end_at)
        .bind(update.max_users)
        .bind(update.is_active)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(event)
    }

    pub async fn delete_event(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    // --- event registrations ---

    pub async fn register_event_user(
        &self,
        event_id: i64,
        user_id: i64,
        created_at: NaiveDate,
        score: Option<i32>,
    ) -> Result<EventUser, AppError> {
        let registration = sqlx::query_as::<_, EventUser>(
            r#"
            INSERT INTO event_users (user_id, event_id, created_at, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, event_id, created_at, score
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .bind(created_at)
        .bind(score)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(registration)
    }

    pub async fn list_event_registrations(
        &self,
        event_id: i64,
    ) -> Result<Vec<EventRegistration>, AppError> {
        let registrations = sqlx::query_as::<_, EventRegistration>(
            r#"
            SELECT eu.id, eu.user_id, eu.event_id, eu.created_at, u.username
            FROM event_users eu
            JOIN users u ON u.id = eu.user_id
            WHERE eu.event_id = $1
            ORDER BY eu.id ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(registrations)
    }

    // --- sessions ---

    pub async fn create_session(&self, session: &UserSession) -> Result<UserSession, AppError> {
        let session = sqlx::query_as::<_, UserSession>(
            r#"
            INSERT INTO user_sessions (user_id, token, expires_at, created_at, last_activity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token, expires_at, created_at, last_activity
            "#,
        )
        .bind(session.user_id)
        .bind(&session.token)
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.last_activity)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    pub async fn get_session_by_token(&self, token: &str) -> Result<Option<UserSession>, AppError> {
        let session = sqlx::query_as::<_, UserSession>(
            "SELECT id, user_id, token, expires_at, created_at, last_activity FROM user_sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    pub async fn update_session_activity(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE user_sessions SET last_activity = $1 WHERE token = $2")
            .bind(Utc::now())
            .bind(token)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_sessions WHERE token = $1")
            .bind(token)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
