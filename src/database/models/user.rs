use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::auth::permissions::Role;
use crate::auth::AuthError;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string, never serialized
    pub password: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL
        )
    "#;

    pub fn role(&self) -> Result<Role, AuthError> {
        self.role.parse()
    }
}
