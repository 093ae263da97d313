use chrono::{DateTime, Utc};
use llm_eval_core::domain::{Project, ProjectId};
use llm_eval_core::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Provision a project. The engine never calls this; projects come from the dashboard.
    pub async fn create(&self, project: &Project) -> Result<Project> {
        let row = sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row_to_project(row))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM projects
            WHERE name = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_project))
    }
}

fn row_to_project(row: sqlx::postgres::PgRow) -> Project {
    let id: Uuid = row.get("id");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    Project {
        id: ProjectId(id),
        name: row.get("name"),
        description: row.get("description"),
        created_at,
        updated_at,
    }
}
