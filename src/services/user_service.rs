use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::test_dto::CreateUserPayload;
use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::utils::crypto::hash_password;

const USER_COLUMNS: &str = "id, email, name, password, role, created_at, updated_at";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, payload: CreateUserPayload) -> Result<User> {
        let password = hash_password(&payload.password)?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(payload.email.to_lowercase())
        .bind(payload.name)
        .bind(password)
        .bind(payload.role.unwrap_or(UserRole::User))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("Email already registered".to_string()),
            other => other,
        })?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Utente non trovato".to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
