use async_trait::async_trait;

use crate::domain::{EvalContext, EvalResult, EvalRun, EvalRunId, NewEvalResult, NewEvalRun};
use crate::error::Result;

/// Persistence collaborator consumed by the evaluation engine.
///
/// Every call may fail; the engine decides which failures abort a run and
/// which are only logged.
#[async_trait]
pub trait EvalStore: Send + Sync {
    /// Resolve the project (must already exist) and find or create the eval name.
    async fn find_or_create_context(
        &self,
        project_name: &str,
        eval_name: &str,
        description: Option<&str>,
    ) -> Result<EvalContext>;

    async fn create_run(&self, run: NewEvalRun) -> Result<EvalRun>;

    async fn update_run_progress(&self, run_id: EvalRunId, completed_items: u32) -> Result<EvalRun>;

    async fn complete_run(&self, run_id: EvalRunId) -> Result<EvalRun>;

    async fn fail_run(&self, run_id: EvalRunId) -> Result<EvalRun>;

    /// Insert result rows. Implementations may split the input into batches.
    async fn bulk_create_results(&self, rows: Vec<NewEvalResult>) -> Result<Vec<EvalResult>>;
}
