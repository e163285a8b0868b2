//! PostgreSQL user repository.

use crate::traits::UserRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larder_core::{LarderResult, User, UserId};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, keycloak_id, username, email, first_name, last_name, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    keycloak_id: String,
    username: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            keycloak_id: row.keycloak_id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> LarderResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_keycloak_id(&self, keycloak_id: &str) -> LarderResult<Option<User>> {
        debug!("Finding user by keycloak id: {}", keycloak_id);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE keycloak_id = $1"
        ))
        .bind(keycloak_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> LarderResult<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY username"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn save(&self, user: &User) -> LarderResult<User> {
        debug!("Saving user: {}", user.username);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, keycloak_id, username, email, first_name, last_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id.into_inner())
        .bind(&user.keycloak_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, user: &User) -> LarderResult<User> {
        debug!("Updating user: {}", user.id);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, first_name = $4, last_name = $5, updated_at = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id.into_inner())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: UserId) -> LarderResult<bool> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
