#![allow(dead_code)]

use async_trait::async_trait;
use llm_eval_core::domain::{
    DataItem, EvalContext, EvalResult, EvalRun, EvalRunId, EvalScore, NewEvalResult, NewEvalRun,
};
use llm_eval_core::{CoreError, EvalStore, Result};
use llm_eval_engine::{scorer, BoxedScorer, EvalTask, StaticDataset};
use llm_eval_storage::InMemoryEvalStore;
use std::sync::Arc;

pub type NumberItem = DataItem<u32, u32>;

/// Inputs `0..n`, each expecting its double.
pub fn numbers(n: u32) -> StaticDataset<u32, u32> {
    StaticDataset::new((0..n).map(|i| DataItem::new(i).with_expected(i * 2)).collect())
}

pub fn doubling_task() -> impl EvalTask<u32, u32, u32> {
    |item: Arc<NumberItem>| async move { Ok::<_, anyhow::Error>(item.input * 2) }
}

/// Scores the output value itself.
pub fn value_scorer() -> BoxedScorer<u32, u32, u32, EvalScore> {
    scorer(|output: Arc<u32>, _item: Arc<NumberItem>| async move {
        Ok::<_, anyhow::Error>(EvalScore::new("value", *output as f64))
    })
}

/// 1.0 when the output equals the expected value.
pub fn exact_scorer() -> BoxedScorer<u32, u32, u32, EvalScore> {
    scorer(|output: Arc<u32>, item: Arc<NumberItem>| async move {
        let value = if item.expected == Some(*output) { 1.0 } else { 0.0 };
        Ok::<_, anyhow::Error>(EvalScore::new("exact", value))
    })
}

/// In-memory store with a provisioned `demo` project.
pub async fn demo_store() -> InMemoryEvalStore {
    let store = InMemoryEvalStore::new();
    store
        .create_project("demo", Some("test project".to_string()))
        .await
        .expect("Failed to create project");
    store
}

/// Wraps [`InMemoryEvalStore`] and fails selected calls.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryEvalStore,
    pub fail_progress: bool,
    pub fail_bulk: bool,
    pub fail_complete: bool,
    pub fail_fail: bool,
}

impl FlakyStore {
    pub fn new(inner: InMemoryEvalStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }
}

fn injected(call: &str) -> CoreError {
    CoreError::Internal(format!("injected {} failure", call))
}

#[async_trait]
impl EvalStore for FlakyStore {
    async fn find_or_create_context(
        &self,
        project_name: &str,
        eval_name: &str,
        description: Option<&str>,
    ) -> Result<EvalContext> {
        self.inner
            .find_or_create_context(project_name, eval_name, description)
            .await
    }

    async fn create_run(&self, run: NewEvalRun) -> Result<EvalRun> {
        self.inner.create_run(run).await
    }

    async fn update_run_progress(&self, run_id: EvalRunId, completed_items: u32) -> Result<EvalRun> {
        if self.fail_progress {
            return Err(injected("progress"));
        }
        self.inner.update_run_progress(run_id, completed_items).await
    }

    async fn complete_run(&self, run_id: EvalRunId) -> Result<EvalRun> {
        if self.fail_complete {
            return Err(injected("complete"));
        }
        self.inner.complete_run(run_id).await
    }

    async fn fail_run(&self, run_id: EvalRunId) -> Result<EvalRun> {
        if self.fail_fail {
            return Err(injected("fail"));
        }
        self.inner.fail_run(run_id).await
    }

    async fn bulk_create_results(&self, rows: Vec<NewEvalResult>) -> Result<Vec<EvalResult>> {
        if self.fail_bulk {
            return Err(injected("bulk"));
        }
        self.inner.bulk_create_results(rows).await
    }
}
