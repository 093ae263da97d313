use llm_eval_core::CoreError;
use thiserror::Error;

/// Failure of an evaluation. Wrapping variants keep the root cause so callers
/// can downcast or match on the original error.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Invalid evaluation config: {0}")]
    Config(String),

    #[error(transparent)]
    Dataset(anyhow::Error),

    #[error(transparent)]
    Task(anyhow::Error),

    #[error(transparent)]
    Scorer(anyhow::Error),

    #[error(transparent)]
    Store(#[from] CoreError),

    #[error(transparent)]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("Concurrency limiter closed")]
    LimiterClosed(#[from] tokio::sync::AcquireError),

    /// A unit ended without reporting, which happens when it panicked.
    #[error("Evaluation unit stopped without a result")]
    UnitLost,
}

impl EvalError {
    /// The user-function error behind a dataset, task or scorer failure.
    pub fn user_error(&self) -> Option<&anyhow::Error> {
        match self {
            EvalError::Dataset(e) | EvalError::Task(e) | EvalError::Scorer(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
