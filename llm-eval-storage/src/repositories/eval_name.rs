use chrono::{DateTime, Utc};
use llm_eval_core::domain::{EvalName, EvalNameId, ProjectId};
use llm_eval_core::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct EvalNameRepository {
    pool: PgPool,
}

impl EvalNameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, eval_name: &EvalName) -> Result<EvalName> {
        let row = sqlx::query(
            r#"
            INSERT INTO eval_names (id, project_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, project_id, name, description, created_at, updated_at
            "#,
        )
        .bind(eval_name.id.0)
        .bind(eval_name.project_id.0)
        .bind(&eval_name.name)
        .bind(&eval_name.description)
        .bind(eval_name.created_at)
        .bind(eval_name.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row_to_eval_name(row))
    }

    /// Look up an eval name within a project
    pub async fn get_by_name(&self, project_id: &ProjectId, name: &str) -> Result<Option<EvalName>> {
        let row = sqlx::query(
            r#"
            SELECT id, project_id, name, description, created_at, updated_at
            FROM eval_names
            WHERE project_id = $1 AND name = $2
            LIMIT 1
            "#,
        )
        .bind(project_id.0)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_eval_name))
    }
}

fn row_to_eval_name(row: sqlx::postgres::PgRow) -> EvalName {
    let id: Uuid = row.get("id");
    let project_id: Uuid = row.get("project_id");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    EvalName {
        id: EvalNameId(id),
        project_id: ProjectId(project_id),
        name: row.get("name"),
        description: row.get("description"),
        created_at,
        updated_at,
    }
}
