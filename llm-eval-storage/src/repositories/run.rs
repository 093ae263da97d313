use chrono::{DateTime, Utc};
use llm_eval_core::domain::{EvalNameId, EvalRun, EvalRunId, RunOrder, RunQuery, RunStatus};
use llm_eval_core::{CoreError, Result};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const RUN_COLUMNS: &str = "id, eval_name_id, status, max_concurrency, total_items, completed_items, \
                           output_dir, started_at, completed_at, metadata";

pub struct EvalRunRepository {
    pool: PgPool,
}

impl EvalRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new eval run
    pub async fn create(&self, run: &EvalRun) -> Result<EvalRun> {
        let sql = format!(
            r#"
            INSERT INTO eval_runs (
                id, eval_name_id, status, max_concurrency, total_items, completed_items,
                output_dir, started_at, completed_at, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            RUN_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(run.id.0)
            .bind(run.eval_name_id.0)
            .bind(run.status.as_str())
            .bind(run.max_concurrency as i32)
            .bind(run.total_items as i32)
            .bind(run.completed_items as i32)
            .bind(&run.output_dir)
            .bind(run.started_at)
            .bind(run.completed_at)
            .bind(&run.metadata)
            .fetch_one(&self.pool)
            .await?;

        row_to_run(row)
    }

    /// Get run by ID
    pub async fn get_by_id(&self, id: &EvalRunId) -> Result<Option<EvalRun>> {
        let sql = format!("SELECT {} FROM eval_runs WHERE id = $1", RUN_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_run).transpose()
    }

    /// Record how many items have completed; never exceeds `total_items`
    pub async fn update_progress(&self, id: &EvalRunId, completed_items: u32) -> Result<EvalRun> {
        let sql = format!(
            r#"
            UPDATE eval_runs
            SET completed_items = LEAST($2, total_items)
            WHERE id = $1
            RETURNING {}
            "#,
            RUN_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id.0)
            .bind(completed_items as i32)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| run_not_found(id))?;

        row_to_run(row)
    }

    /// Move a run to a terminal status and stamp `completed_at`
    pub async fn finish(&self, id: &EvalRunId, status: RunStatus) -> Result<EvalRun> {
        let sql = format!(
            r#"
            UPDATE eval_runs
            SET status = $2, completed_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RUN_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id.0)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| run_not_found(id))?;

        row_to_run(row)
    }

    /// List runs of an eval name
    pub async fn list_for_eval_name(
        &self,
        eval_name_id: &EvalNameId,
        query: &RunQuery,
    ) -> Result<Vec<EvalRun>> {
        let order = match query.order {
            RunOrder::Newest => "DESC",
            RunOrder::Oldest => "ASC",
        };
        let sql = format!(
            r#"
            SELECT {}
            FROM eval_runs
            WHERE eval_name_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY started_at {}
            LIMIT $3 OFFSET $4
            "#,
            RUN_COLUMNS, order
        );

        let rows = sqlx::query(&sql)
            .bind(eval_name_id.0)
            .bind(query.status.map(|status| status.as_str()))
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_run).collect()
    }
}

fn run_not_found(id: &EvalRunId) -> CoreError {
    CoreError::NotFound(format!("Eval run {} not found", id))
}

fn row_to_run(row: sqlx::postgres::PgRow) -> Result<EvalRun> {
    let id: Uuid = row.get("id");
    let eval_name_id: Uuid = row.get("eval_name_id");
    let status_str: String = row.get("status");
    let max_concurrency: i32 = row.get("max_concurrency");
    let total_items: i32 = row.get("total_items");
    let completed_items: i32 = row.get("completed_items");
    let started_at: DateTime<Utc> = row.get("started_at");
    let completed_at: Option<DateTime<Utc>> = row.get("completed_at");

    Ok(EvalRun {
        id: EvalRunId(id),
        eval_name_id: EvalNameId(eval_name_id),
        status: status_str.parse()?,
        max_concurrency: max_concurrency as u32,
        total_items: total_items as u32,
        completed_items: completed_items as u32,
        output_dir: row.get("output_dir"),
        started_at,
        completed_at,
        metadata: row.get("metadata"),
    })
}
