//! Project repository
//!
//! Projects span departments through the project_departments join table
//! and carry participants through project_participants.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use ts_core::traits::Id;
use ts_models::{Project, ProjectParticipation, ProjectRole, ProjectStatus};

use crate::repository::{RepositoryError, RepositoryResult};

/// Project database row
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self, department_ids: Vec<Id>) -> RepositoryResult<Project> {
        Ok(Project {
            id: Some(self.id),
            name: self.name,
            description: self.description,
            status: ProjectStatus::normalize(&self.status)?,
            department_ids,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

/// DTO for creating a project
#[derive(Debug, Clone)]
pub struct CreateProjectDto {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub department_ids: Vec<Id>,
}

/// DTO for updating a project
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub department_ids: Option<Vec<Id>>,
}

const PROJECT_COLUMNS: &str = "id, name, description, status, created_at, updated_at";

/// Project repository implementation
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let departments = self.department_ids(row.id).await?;
                Ok(Some(row.into_project(departments)?))
            }
            None => Ok(None),
        }
    }

    pub async fn list(&self, department_id: Option<Id>) -> RepositoryResult<Vec<Project>> {
        let rows = match department_id {
            Some(dept) => {
                sqlx::query_as::<_, ProjectRow>(&format!(
                    r#"
                    SELECT {PROJECT_COLUMNS} FROM projects
                    WHERE id IN (SELECT project_id FROM project_departments WHERE department_id = $1)
                    ORDER BY id DESC
                    "#
                ))
                .bind(dept)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProjectRow>(&format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            let departments = self.department_ids(row.id).await?;
            projects.push(row.into_project(departments)?);
        }
        Ok(projects)
    }

    /// Most recently touched projects, for the dashboard snapshot
    pub async fn recent(&self, limit: i64) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY updated_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            let departments = self.department_ids(row.id).await?;
            projects.push(row.into_project(departments)?);
        }
        Ok(projects)
    }

    pub async fn create(&self, dto: CreateProjectDto) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects (name, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        let project_id = row.id;
        self.set_departments(project_id, &dto.department_ids).await?;
        row.into_project(dto.department_ids)
    }

    pub async fn update(&self, id: Id, dto: UpdateProjectDto) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            UPDATE projects SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                status = COALESCE($3, status),
                updated_at = NOW()
            WHERE id = $4
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.status.map(|s| s.as_str()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity: "Project",
            id,
        })?;

        if let Some(department_ids) = &dto.department_ids {
            self.set_departments(id, department_ids).await?;
        }

        let departments = self.department_ids(id).await?;
        row.into_project(departments)
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Project", id));
        }
        Ok(())
    }

    // Participants

    pub async fn participants(&self, project_id: Id) -> RepositoryResult<Vec<ProjectParticipation>> {
        let rows = sqlx::query_as::<_, (i64, i64, String)>(
            "SELECT project_id, user_id, role FROM project_participants WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(project_id, user_id, role)| {
                Ok(ProjectParticipation {
                    project_id,
                    user_id,
                    role: ProjectRole::normalize(&role)?,
                })
            })
            .collect()
    }

    pub async fn add_participant(
        &self,
        project_id: Id,
        user_id: Id,
        role: ProjectRole,
    ) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO project_participants (project_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn department_ids(&self, project_id: Id) -> RepositoryResult<Vec<Id>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT department_id FROM project_departments WHERE project_id = $1 ORDER BY department_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn set_departments(&self, project_id: Id, department_ids: &[Id]) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM project_departments WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        for department_id in department_ids {
            sqlx::query(
                "INSERT INTO project_departments (project_id, department_id) VALUES ($1, $2)",
            )
            .bind(project_id)
            .bind(department_id)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}
