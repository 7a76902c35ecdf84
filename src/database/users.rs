use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::auth::password::{self, Argon2Params};
use crate::auth::permissions::Role;
use crate::auth::{AuthError, AuthUser, TokenSigner};
use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// Credential store backed by the `users` table.
#[derive(Clone, Debug)]
pub struct UserStore {
    pool: SqlitePool,
    signer: TokenSigner,
    hashing: Argon2Params,
}

impl UserStore {
    pub fn new(pool: SqlitePool, signer: TokenSigner, hashing: Argon2Params) -> Self {
        Self {
            pool,
            signer,
            hashing,
        }
    }

    pub async fn sync(&self) -> Result<(), DatabaseError> {
        sqlx::query(User::SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Store a new user and hand back its identity with a freshly minted token.
    pub async fn create(&self, username: &str, password: &str, role: Role) -> Result<AuthUser, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let hashing = self.hashing;
        let plaintext = password.to_string();
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext, hashing))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))??;

        let result = sqlx::query("INSERT INTO users (username, password, role, created_at) VALUES (?, ?, ?, ?)")
            .bind(username)
            .bind(&hash)
            .bind(role.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await;

        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!("Signup rejected, username '{}' is taken", username);
                return Err(AuthError::DuplicateUser(username.to_string()));
            }
            Err(e) => return Err(DatabaseError::from(e).into()),
        };

        info!("Created user '{}' with role {}", username, role);
        Ok(AuthUser {
            id,
            username: username.to_string(),
            role,
            token: self.signer.issue(username, role)?,
        })
    }

    /// Usernames are stored trimmed, so lookups trim too.
    pub async fn find_by_username(&self, username: &str) -> Result<User, AuthError> {
        let username = username.trim();
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, role, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or(AuthError::NotFound)
    }

    pub async fn verify_password(&self, user: &User, plaintext: &str) -> Result<bool, AuthError> {
        let hash = user.password.clone();
        let plaintext = plaintext.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &hash))
            .await
            .map_err(|e| AuthError::Hashing(format!("verification task failed: {e}")))?
    }

    /// Basic credential check used at signin; mints a new token on success.
    pub async fn authenticate(&self, username: &str, plaintext: &str) -> Result<AuthUser, AuthError> {
        let username = username.trim();
        let user = match self.find_by_username(username).await {
            Ok(user) => user,
            Err(AuthError::NotFound) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        if !self.verify_password(&user, plaintext).await? {
            debug!("Password mismatch for '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        let role = user.role()?;
        Ok(AuthUser {
            id: user.id,
            username: user.username.clone(),
            role,
            token: self.signer.issue(&user.username, role)?,
        })
    }

    /// Resolve a bearer token to the user it was issued for.
    ///
    /// The presented token is carried through unchanged; nothing new is minted.
    pub async fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.signer.verify(token)?;

        let user = match self.find_by_username(&claims.sub).await {
            Ok(user) => user,
            Err(AuthError::NotFound) => {
                return Err(AuthError::InvalidToken(format!("unknown subject '{}'", claims.sub)))
            }
            Err(e) => return Err(e),
        };

        Ok(AuthUser {
            id: user.id,
            role: user.role()?,
            username: user.username,
            token: token.to_string(),
        })
    }

    pub async fn list_usernames(&self) -> Result<Vec<String>, AuthError> {
        let names = sqlx::query_scalar::<_, String>("SELECT username FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(names)
    }
}
