use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Full row of the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public user fields plus whether the caller follows them
#[derive(Debug, Clone, FromRow)]
pub struct UserWithSubscription {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// Author row for the subscriptions listing
#[derive(Debug, Clone, FromRow)]
pub struct SubscribedAuthor {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub recipes_count: i64,
}
