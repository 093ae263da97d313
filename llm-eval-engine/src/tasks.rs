//! The user-supplied pieces of an evaluation: where the dataset comes from,
//! what runs against each item, and how outputs are scored.
//!
//! Each trait has a blanket impl for async closures, so most callers pass
//! closures directly:
//!
//! ```ignore
//! let task = |item: Arc<DataItem<u32, u32>>| async move { Ok(item.input * 2) };
//! ```

use async_trait::async_trait;
use llm_eval_core::domain::DataItem;
use std::future::Future;
use std::sync::Arc;

pub type Dataset<I, E> = Vec<DataItem<I, E>>;

/// Shared handle to a scorer, as held by the engine.
pub type BoxedScorer<I, E, O, S> = Arc<dyn EvalScorer<I, E, O, S>>;

/// Produces the ordered dataset for one `evaluate()` call.
#[async_trait]
pub trait DataProvider<I, E>: Send + Sync {
    async fn load(&self) -> anyhow::Result<Dataset<I, E>>;
}

/// Maps one data item to an output.
#[async_trait]
pub trait EvalTask<I, E, O>: Send + Sync {
    async fn run(&self, item: Arc<DataItem<I, E>>) -> anyhow::Result<O>;
}

/// Computes one named score for an item's output.
#[async_trait]
pub trait EvalScorer<I, E, O, S>: Send + Sync {
    async fn score(&self, output: Arc<O>, item: Arc<DataItem<I, E>>) -> anyhow::Result<S>;
}

#[async_trait]
impl<F, Fut, I, E> DataProvider<I, E> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Dataset<I, E>>> + Send + 'static,
    I: Send + 'static,
    E: Send + 'static,
{
    async fn load(&self) -> anyhow::Result<Dataset<I, E>> {
        (self)().await
    }
}

#[async_trait]
impl<F, Fut, I, E, O> EvalTask<I, E, O> for F
where
    F: Fn(Arc<DataItem<I, E>>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    I: Send + Sync + 'static,
    E: Send + Sync + 'static,
    O: Send + 'static,
{
    async fn run(&self, item: Arc<DataItem<I, E>>) -> anyhow::Result<O> {
        (self)(item).await
    }
}

#[async_trait]
impl<F, Fut, I, E, O, S> EvalScorer<I, E, O, S> for F
where
    F: Fn(Arc<O>, Arc<DataItem<I, E>>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<S>> + Send + 'static,
    I: Send + Sync + 'static,
    E: Send + Sync + 'static,
    O: Send + Sync + 'static,
    S: Send + 'static,
{
    async fn score(&self, output: Arc<O>, item: Arc<DataItem<I, E>>) -> anyhow::Result<S> {
        (self)(output, item).await
    }
}

/// Box a scorer for [`crate::Evaluation::new`].
pub fn scorer<I, E, O, S, T>(scorer: T) -> BoxedScorer<I, E, O, S>
where
    T: EvalScorer<I, E, O, S> + 'static,
{
    Arc::new(scorer)
}

/// A fixed, in-memory dataset.
#[derive(Debug, Clone)]
pub struct StaticDataset<I, E> {
    items: Dataset<I, E>,
}

impl<I, E> StaticDataset<I, E> {
    pub fn new(items: Dataset<I, E>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl<I, E> DataProvider<I, E> for StaticDataset<I, E>
where
    I: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    async fn load(&self) -> anyhow::Result<Dataset<I, E>> {
        Ok(self.items.clone())
    }
}
