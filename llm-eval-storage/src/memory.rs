use async_trait::async_trait;
use llm_eval_core::domain::{
    EvalContext, EvalName, EvalNameId, EvalResult, EvalRun, EvalRunId, NewEvalResult,
    NewEvalRun, Project, ResultQuery, RunOrder, RunQuery, RunStatus,
};
use llm_eval_core::{CoreError, EvalStore, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::store::project_not_found;

/// Lifecycle events recorded per run, in call order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunEvent {
    Created,
    Progress(u32),
    Completed,
    Failed,
}

#[derive(Default)]
struct MemoryState {
    projects: HashMap<String, Project>,
    eval_names: Vec<EvalName>,
    runs: HashMap<EvalRunId, EvalRun>,
    events: HashMap<EvalRunId, Vec<RunEvent>>,
    results: Vec<EvalResult>,
}

/// In-process [`EvalStore`], for tests and database-less runs.
///
/// Terminal statuses are final: completing or failing a finished run is an
/// `InvalidState` error.
#[derive(Clone, Default)]
pub struct InMemoryEvalStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryEvalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_project(&self, name: &str, description: Option<String>) -> Result<Project> {
        let mut state = self.state.write().await;
        if state.projects.contains_key(name) {
            return Err(CoreError::AlreadyExists(format!("Project \"{}\"", name)));
        }
        let project = Project::new(name, description);
        state.projects.insert(name.to_string(), project.clone());
        Ok(project)
    }

    pub async fn get_run(&self, run_id: EvalRunId) -> Option<EvalRun> {
        self.state.read().await.runs.get(&run_id).cloned()
    }

    pub async fn run_events(&self, run_id: EvalRunId) -> Vec<RunEvent> {
        self.state
            .read()
            .await
            .events
            .get(&run_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn eval_names(&self) -> Vec<EvalName> {
        self.state.read().await.eval_names.clone()
    }

    pub async fn all_runs(&self) -> Vec<EvalRun> {
        self.state.read().await.runs.values().cloned().collect()
    }

    pub async fn list_runs(&self, eval_name_id: EvalNameId, query: &RunQuery) -> Vec<EvalRun> {
        let state = self.state.read().await;
        let mut runs: Vec<EvalRun> = state
            .runs
            .values()
            .filter(|run| run.eval_name_id == eval_name_id)
            .filter(|run| query.status.map_or(true, |status| run.status == status))
            .cloned()
            .collect();

        runs.sort_by_key(|run| run.started_at);
        if query.order == RunOrder::Newest {
            runs.reverse();
        }

        page(runs, query.limit, query.offset)
    }

    pub async fn list_results(&self, run_id: EvalRunId, query: &ResultQuery) -> Vec<EvalResult> {
        let state = self.state.read().await;
        let mut results: Vec<EvalResult> = state
            .results
            .iter()
            .filter(|result| result.eval_run_id == run_id)
            .cloned()
            .collect();
        results.sort_by_key(|result| result.item_index);

        page(results, query.limit, query.offset)
    }

    async fn finish(&self, run_id: EvalRunId, status: RunStatus) -> Result<EvalRun> {
        let mut state = self.state.write().await;
        let run = state
            .runs
            .get_mut(&run_id)
            .ok_or_else(|| CoreError::NotFound(format!("Eval run {} not found", run_id)))?;

        if run.status.is_terminal() {
            return Err(CoreError::InvalidState(format!(
                "Eval run {} already {}",
                run_id, run.status
            )));
        }

        run.finish(status);
        let run = run.clone();
        let event = match status {
            RunStatus::Failed => RunEvent::Failed,
            _ => RunEvent::Completed,
        };
        state.events.entry(run_id).or_default().push(event);
        Ok(run)
    }
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl EvalStore for InMemoryEvalStore {
    async fn find_or_create_context(
        &self,
        project_name: &str,
        eval_name: &str,
        description: Option<&str>,
    ) -> Result<EvalContext> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .get(project_name)
            .cloned()
            .ok_or_else(|| project_not_found(project_name))?;

        let existing = state
            .eval_names
            .iter()
            .find(|name| name.project_id == project.id && name.name == eval_name)
            .cloned();

        let eval_name = match existing {
            Some(found) => found,
            None => {
                let created = EvalName::new(project.id, eval_name, description.map(str::to_string));
                state.eval_names.push(created.clone());
                created
            }
        };

        Ok(EvalContext { project, eval_name })
    }

    async fn create_run(&self, run: NewEvalRun) -> Result<EvalRun> {
        let mut state = self.state.write().await;
        if !state.eval_names.iter().any(|name| name.id == run.eval_name_id) {
            return Err(CoreError::NotFound(format!(
                "Eval name {} not found",
                run.eval_name_id
            )));
        }

        let run = EvalRun::start(run);
        state.events.insert(run.id, vec![RunEvent::Created]);
        state.runs.insert(run.id, run.clone());
        Ok(run)
    }

    async fn update_run_progress(&self, run_id: EvalRunId, completed_items: u32) -> Result<EvalRun> {
        let mut state = self.state.write().await;
        let run = state
            .runs
            .get_mut(&run_id)
            .ok_or_else(|| CoreError::NotFound(format!("Eval run {} not found", run_id)))?;

        run.record_progress(completed_items);
        let run = run.clone();
        state
            .events
            .entry(run_id)
            .or_default()
            .push(RunEvent::Progress(run.completed_items));
        Ok(run)
    }

    async fn complete_run(&self, run_id: EvalRunId) -> Result<EvalRun> {
        self.finish(run_id, RunStatus::Completed).await
    }

    async fn fail_run(&self, run_id: EvalRunId) -> Result<EvalRun> {
        self.finish(run_id, RunStatus::Failed).await
    }

    async fn bulk_create_results(&self, rows: Vec<NewEvalResult>) -> Result<Vec<EvalResult>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut state = self.state.write().await;
        for row in &rows {
            if !state.runs.contains_key(&row.eval_run_id) {
                return Err(CoreError::NotFound(format!(
                    "Eval run {} not found",
                    row.eval_run_id
                )));
            }
        }

        let created: Vec<EvalResult> = rows.into_iter().map(EvalResult::from).collect();
        state.results.extend(created.iter().cloned());
        Ok(created)
    }
}
