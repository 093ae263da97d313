use chrono::{DateTime, Utc};
use llm_eval_core::domain::{
    EvalResult, EvalResultId, EvalRunId, EvalScore, NewEvalResult, ResultQuery,
};
use llm_eval_core::Result;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

/// Rows per INSERT statement when bulk-creating results.
pub const RESULT_BATCH_SIZE: usize = 1000;

const RESULT_COLUMNS: &str =
    "id, eval_run_id, item_index, input, expected, output, scores, metadata, created_at";

pub struct EvalResultRepository {
    pool: PgPool,
}

impl EvalResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert results in batches of [`RESULT_BATCH_SIZE`]
    pub async fn create_many(&self, rows: Vec<NewEvalResult>) -> Result<Vec<EvalResult>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let results: Vec<EvalResult> = rows.into_iter().map(EvalResult::from).collect();
        let mut created = Vec::with_capacity(results.len());

        for chunk in results.chunks(RESULT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO eval_results ({}) ",
                RESULT_COLUMNS
            ));

            let mut encoded = Vec::with_capacity(chunk.len());
            for result in chunk {
                encoded.push((result, serde_json::to_value(&result.scores)?));
            }

            builder.push_values(encoded, |mut b, (result, scores)| {
                b.push_bind(result.id.0)
                    .push_bind(result.eval_run_id.0)
                    .push_bind(result.item_index as i32)
                    .push_bind(result.input.clone())
                    .push_bind(result.expected.clone())
                    .push_bind(result.output.clone())
                    .push_bind(scores)
                    .push_bind(result.metadata.clone().map(Value::Object))
                    .push_bind(result.created_at);
            });
            builder.push(format!(" RETURNING {}", RESULT_COLUMNS));

            let inserted = builder.build().fetch_all(&self.pool).await?;
            for row in inserted {
                created.push(row_to_result(row)?);
            }

            tracing::debug!(rows = chunk.len(), "Inserted eval result batch");
        }

        Ok(created)
    }

    /// List results of a run ordered by item index
    pub async fn list_for_run(&self, run_id: &EvalRunId, query: &ResultQuery) -> Result<Vec<EvalResult>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM eval_results
            WHERE eval_run_id = $1
            ORDER BY item_index ASC
            LIMIT $2 OFFSET $3
            "#,
            RESULT_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(run_id.0)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_result).collect()
    }

    pub async fn count_for_run(&self, run_id: &EvalRunId) -> Result<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM eval_results WHERE eval_run_id = $1")
                .bind(run_id.0)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.unwrap_or(0))
    }
}

fn row_to_result(row: sqlx::postgres::PgRow) -> Result<EvalResult> {
    let id: Uuid = row.get("id");
    let eval_run_id: Uuid = row.get("eval_run_id");
    let item_index: i32 = row.get("item_index");
    let scores_json: Value = row.get("scores");
    let metadata_json: Option<Value> = row.get("metadata");
    let created_at: DateTime<Utc> = row.get("created_at");

    let scores: Vec<EvalScore> = serde_json::from_value(scores_json)?;
    let metadata = match metadata_json {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    };

    Ok(EvalResult {
        id: EvalResultId(id),
        eval_run_id: EvalRunId(eval_run_id),
        item_index: item_index as u32,
        input: row.get("input"),
        expected: row.get("expected"),
        output: row.get("output"),
        scores,
        metadata,
        created_at,
    })
}
