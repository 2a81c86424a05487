//! User repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use ts_core::pagination::{PaginatedResult, Pagination};
use ts_core::traits::Id;
use ts_models::{Role, User};

use crate::repository::{RepositoryError, RepositoryResult};

/// User database row
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub capacity: f64,
    pub department_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert into the domain model, normalizing the stored role
    pub fn into_user(self) -> RepositoryResult<User> {
        Ok(User {
            id: Some(self.id),
            name: self.name,
            email: self.email,
            role: Role::normalize(&self.role)?,
            capacity: self.capacity,
            department_id: self.department_id,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

/// DTO for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub capacity: f64,
    pub department_id: Option<Id>,
}

/// DTO for updating a user; None leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateUserDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub capacity: Option<f64>,
    pub department_id: Option<Option<Id>>,
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, capacity, department_id, created_at, updated_at";

/// User repository implementation
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list(
        &self,
        department_id: Option<Id>,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($1::bigint IS NULL OR department_id = $1)
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(department_id)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE ($1::bigint IS NULL OR department_id = $1)",
        )
        .bind(department_id)
        .fetch_one(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(UserRow::into_user)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(users, total, pagination))
    }

    pub async fn create(&self, dto: CreateUserDto) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, capacity, department_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.password_hash)
        .bind(dto.role.as_str())
        .bind(dto.capacity)
        .bind(dto.department_id)
        .fetch_one(&self.pool)
        .await?;

        row.into_user()
    }

    pub async fn update(&self, id: Id, dto: UpdateUserDto) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($1, name),
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                role = COALESCE($4, role),
                capacity = COALESCE($5, capacity),
                department_id = CASE WHEN $6 THEN $7 ELSE department_id END,
                updated_at = NOW()
            WHERE id = $8
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.password_hash)
        .bind(dto.role.map(|r| r.as_str()))
        .bind(dto.capacity)
        .bind(dto.department_id.is_some())
        .bind(dto.department_id.flatten())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "User",
            id,
        })?;

        row.into_user()
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("User", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
