use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub description: String,
    pub created_by: i64,
    pub begin_at: NaiveDate,
    pub end_at: NaiveDate,
    pub max_users: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub description: String,
    pub created_by: i64,
    pub begin_at: NaiveDate,
    pub end_at: NaiveDate,
    pub max_users: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub description: Option<String>,
    pub begin_at: Option<NaiveDate>,
    pub end_at: Option<NaiveDate>,
    pub max_users: Option<i32>,
    pub is_active: Option<bool>,
}

/// A user's registration to an event. The (user_id, event_id) pair is
/// unique at the database level.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventUser {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub created_at: NaiveDate,
    pub score: Option<i32>,
}

/// Registration row joined with the registered user's name, for the
/// per-event participant listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRegistration {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub created_at: NaiveDate,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSession {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user_id: i64, expires_in_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            token: Uuid::new_v4().to_string(),
            expires_at: now + chrono::Duration::hours(expires_in_hours),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
