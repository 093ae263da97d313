use async_trait::async_trait;
use llm_eval_core::domain::{
    EvalContext, EvalName, EvalNameId, EvalResult, EvalRun, EvalRunId, NewEvalResult,
    NewEvalRun, Project, ResultQuery, RunQuery, RunStatus,
};
use llm_eval_core::{CoreError, EvalStore, Result};
use sqlx::PgPool;

use crate::repositories::{
    EvalNameRepository, EvalResultRepository, EvalRunRepository, ProjectRepository,
};

pub(crate) fn project_not_found(project_name: &str) -> CoreError {
    CoreError::ProjectNotFound(project_name.to_string())
}

/// Postgres-backed [`EvalStore`].
pub struct PgEvalStore {
    projects: ProjectRepository,
    eval_names: EvalNameRepository,
    runs: EvalRunRepository,
    results: EvalResultRepository,
}

impl PgEvalStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: ProjectRepository::new(pool.clone()),
            eval_names: EvalNameRepository::new(pool.clone()),
            runs: EvalRunRepository::new(pool.clone()),
            results: EvalResultRepository::new(pool),
        }
    }

    pub async fn create_project(&self, name: &str, description: Option<String>) -> Result<Project> {
        if self.projects.get_by_name(name).await?.is_some() {
            return Err(CoreError::AlreadyExists(format!("Project \"{}\"", name)));
        }
        self.projects.create(&Project::new(name, description)).await
    }

    pub async fn get_run(&self, run_id: EvalRunId) -> Result<Option<EvalRun>> {
        self.runs.get_by_id(&run_id).await
    }

    pub async fn list_runs(&self, eval_name_id: EvalNameId, query: &RunQuery) -> Result<Vec<EvalRun>> {
        self.runs.list_for_eval_name(&eval_name_id, query).await
    }

    pub async fn list_results(&self, run_id: EvalRunId, query: &ResultQuery) -> Result<Vec<EvalResult>> {
        self.results.list_for_run(&run_id, query).await
    }
}

#[async_trait]
impl EvalStore for PgEvalStore {
    async fn find_or_create_context(
        &self,
        project_name: &str,
        eval_name: &str,
        description: Option<&str>,
    ) -> Result<EvalContext> {
        let project = self
            .projects
            .get_by_name(project_name)
            .await?
            .ok_or_else(|| project_not_found(project_name))?;

        let eval_name = match self.eval_names.get_by_name(&project.id, eval_name).await? {
            Some(existing) => existing,
            None => {
                tracing::info!(project = %project.name, eval_name, "Creating eval name");
                let new_name = EvalName::new(project.id, eval_name, description.map(str::to_string));
                self.eval_names.create(&new_name).await?
            }
        };

        Ok(EvalContext { project, eval_name })
    }

    async fn create_run(&self, run: NewEvalRun) -> Result<EvalRun> {
        self.runs.create(&EvalRun::start(run)).await
    }

    async fn update_run_progress(&self, run_id: EvalRunId, completed_items: u32) -> Result<EvalRun> {
        self.runs.update_progress(&run_id, completed_items).await
    }

    async fn complete_run(&self, run_id: EvalRunId) -> Result<EvalRun> {
        self.runs.finish(&run_id, RunStatus::Completed).await
    }

    async fn fail_run(&self, run_id: EvalRunId) -> Result<EvalRun> {
        self.runs.finish(&run_id, RunStatus::Failed).await
    }

    async fn bulk_create_results(&self, rows: Vec<NewEvalResult>) -> Result<Vec<EvalResult>> {
        self.results.create_many(rows).await
    }
}
