//! Department repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use ts_core::traits::Id;
use ts_models::Department;

use crate::repository::{RepositoryError, RepositoryResult};

/// Department database row
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentRow {
    pub id: i64,
    pub name: String,
    pub head_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DepartmentRow {
    pub fn into_department(self) -> Department {
        Department {
            id: Some(self.id),
            name: self.name,
            head_id: self.head_id,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// DTO for creating a department
#[derive(Debug, Clone)]
pub struct CreateDepartmentDto {
    pub name: String,
    pub head_id: Option<Id>,
}

/// DTO for updating a department
#[derive(Debug, Clone, Default)]
pub struct UpdateDepartmentDto {
    pub name: Option<String>,
    pub head_id: Option<Option<Id>>,
}

const DEPARTMENT_COLUMNS: &str = "id, name, head_id, created_at, updated_at";

/// Department repository implementation
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DepartmentRow::into_department))
    }

    pub async fn list(&self) -> RepositoryResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, DepartmentRow>(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DepartmentRow::into_department).collect())
    }

    pub async fn create(&self, dto: CreateDepartmentDto) -> RepositoryResult<Department> {
        let row = sqlx::query_as::<_, DepartmentRow>(&format!(
            r#"
            INSERT INTO departments (name, head_id, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            RETURNING {DEPARTMENT_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(dto.head_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_department())
    }

    pub async fn update(&self, id: Id, dto: UpdateDepartmentDto) -> RepositoryResult<Department> {
        let row = sqlx::query_as::<_, DepartmentRow>(&format!(
            r#"
            UPDATE departments SET
                name = COALESCE($1, name),
                head_id = CASE WHEN $2 THEN $3 ELSE head_id END,
                updated_at = NOW()
            WHERE id = $4
            RETURNING {DEPARTMENT_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(dto.head_id.is_some())
        .bind(dto.head_id.flatten())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "Department",
            id,
        })?;

        Ok(row.into_department())
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Department", id));
        }
        Ok(())
    }
}
