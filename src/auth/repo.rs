use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::{is_unique_violation, ApiError};

/// User record in the `usuarios` table. Rows are created by registration
/// and never updated or deleted in this system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub rol: String,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, rol
            FROM usuarios
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. The unique constraint on `email` is the single
    /// duplicate gate; a violation surfaces as [`ApiError::DuplicateEmail`]
    /// and leaves the existing row untouched.
    pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, rol
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::DuplicateEmail
            } else {
                ApiError::Database(e)
            }
        })?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            email: "a@b.com".into(),
            password_hash: "$argon2id$secreto".into(),
            rol: "admin".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("a@b.com"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }
}
