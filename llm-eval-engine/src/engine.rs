use futures::future::try_join_all;
use llm_eval_core::domain::{DataItem, EvalConfig, EvalRunId, NewEvalResult, NewEvalRun, Score};
use llm_eval_core::EvalStore;
use llm_eval_scorers::ScoreStats;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::error::{EvalError, Result};
use crate::limiter::ConcurrencyLimiter;
use crate::output::{JsonlRecord, JsonlWriter};
use crate::progress::{
    is_progress_checkpoint, EvalProgress, ProgressReporter, PROGRESS_CHANNEL_CAPACITY,
};
use crate::tasks::{BoxedScorer, DataProvider, EvalTask};

/// Scores of a finished evaluation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvalOutcome<S> {
    /// One entry per dataset item in dataset order, each holding one score
    /// per scorer in registration order.
    pub scores: Vec<Vec<S>>,
    /// Persisted run, when the evaluation was stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<EvalRunId>,
}

impl<S: Score> EvalOutcome<S> {
    pub fn stats(&self) -> ScoreStats {
        ScoreStats::from_scores(&self.scores)
    }
}

/// Runs a task and a set of scorers over every item of a dataset.
pub struct Evaluation<I, E, O, S> {
    data_provider: Arc<dyn DataProvider<I, E>>,
    task: Arc<dyn EvalTask<I, E, O>>,
    scorers: Vec<BoxedScorer<I, E, O, S>>,
    config: EvalConfig,
    store: Option<Arc<dyn EvalStore>>,
    show_progress_bar: bool,
    progress_tx: broadcast::Sender<EvalProgress>,
}

/// Store bookkeeping for the run of one `evaluate()` call.
struct ActiveRun {
    id: EvalRunId,
    store: Arc<dyn EvalStore>,
    failed: AtomicBool,
    persisted_progress: Mutex<usize>,
}

impl ActiveRun {
    /// Persist progress if it moved forward and the run has not failed.
    /// Failures are logged only.
    async fn record_progress(&self, completed: usize) {
        let mut persisted = self.persisted_progress.lock().await;
        if self.failed.load(Ordering::SeqCst) || completed <= *persisted {
            return;
        }

        match self.store.update_run_progress(self.id, to_u32(completed)).await {
            Ok(_) => *persisted = completed,
            Err(e) => warn!(run_id = %self.id, error = %e, "Failed to update eval run progress"),
        }
    }

    /// Mark the run failed, once. Failures are logged only.
    async fn mark_failed(&self) {
        if self.failed.swap(true, Ordering::SeqCst) {
            return;
        }

        // No progress update may land after the failure.
        let _progress = self.persisted_progress.lock().await;
        if let Err(e) = self.store.fail_run(self.id).await {
            error!(run_id = %self.id, error = %e, "Failed to mark eval run as failed");
        }
    }

    async fn complete(&self, rows: Vec<NewEvalResult>) -> Result<()> {
        if !rows.is_empty() {
            let stored = self.store.bulk_create_results(rows).await?;
            debug!(run_id = %self.id, rows = stored.len(), "Stored eval results");
        }
        self.store.complete_run(self.id).await?;
        Ok(())
    }
}

type UnitResult<S> = (usize, Result<Vec<S>>);

/// State shared by the units of one `evaluate()` call. Units run as
/// spawned tasks and outlive the call when another unit fails first.
struct UnitContext<I, E, O, S> {
    task: Arc<dyn EvalTask<I, E, O>>,
    scorers: Arc<[BoxedScorer<I, E, O, S>]>,
    total: usize,
    limiter: ConcurrencyLimiter,
    completed: AtomicUsize,
    halted: AtomicBool,
    rows: Mutex<Vec<NewEvalResult>>,
    progress: ProgressReporter,
    writer: Option<JsonlWriter>,
    run: Option<Arc<ActiveRun>>,
}

impl<I, E, O, S> UnitContext<I, E, O, S>
where
    I: Serialize + Send + Sync + 'static,
    E: Serialize + Send + Sync + 'static,
    O: Serialize + Send + Sync + 'static,
    S: Score + 'static,
{
    /// Start one unit per item in dataset order, each once a slot frees up.
    async fn dispatch(
        self: Arc<Self>,
        dataset: Vec<DataItem<I, E>>,
        results: mpsc::UnboundedSender<UnitResult<S>>,
    ) {
        for (index, item) in dataset.into_iter().enumerate() {
            let permit = match self.limiter.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    let _ = results.send((index, Err(e.into())));
                    return;
                }
            };

            let unit = self.clone();
            let results = results.clone();
            tokio::spawn(async move {
                let result = unit.run_unit(index, Arc::new(item)).await;
                drop(permit);
                // The receiver is gone once the evaluation has failed.
                let _ = results.send((index, result));
            });
        }
    }

    async fn run_unit(&self, index: usize, item: Arc<DataItem<I, E>>) -> Result<Vec<S>> {
        let result = self.process_item(index, item).await;
        if result.is_err() {
            self.halted.store(true, Ordering::SeqCst);
            if let Some(run) = &self.run {
                run.mark_failed().await;
            }
        }
        result
    }

    async fn process_item(&self, index: usize, item: Arc<DataItem<I, E>>) -> Result<Vec<S>> {
        debug!(index, "Running task");
        let output = Arc::new(self.task.run(item.clone()).await.map_err(EvalError::Task)?);

        let scores = try_join_all(
            self.scorers
                .iter()
                .map(|scorer| scorer.score(output.clone(), item.clone())),
        )
        .await
        .map_err(EvalError::Scorer)?;

        if let Some(writer) = &self.writer {
            writer
                .append(&JsonlRecord::new(index, &item, output.as_ref(), &scores))
                .await?;
        }

        if let Some(run) = &self.run {
            let row = NewEvalResult::from_item(run.id, to_u32(index), &item, output.as_ref(), &scores)?;
            self.rows.lock().await.push(row);
        }

        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if self.halted.load(Ordering::SeqCst) {
            return Ok(scores);
        }
        self.progress.update(completed);

        if let Some(run) = &self.run {
            if is_progress_checkpoint(completed, self.total) {
                run.record_progress(completed).await;
            }
        }

        Ok(scores)
    }
}

impl<I, E, O, S> Evaluation<I, E, O, S>
where
    I: Serialize + Send + Sync + 'static,
    E: Serialize + Send + Sync + 'static,
    O: Serialize + Send + Sync + 'static,
    S: Score + 'static,
{
    /// Rejects an invalid config before anything runs.
    pub fn new<P, T>(
        data_provider: P,
        task: T,
        scorers: Vec<BoxedScorer<I, E, O, S>>,
        config: EvalConfig,
    ) -> Result<Self>
    where
        P: DataProvider<I, E> + 'static,
        T: EvalTask<I, E, O> + 'static,
    {
        let config = config
            .validated()
            .map_err(|e| EvalError::Config(e.to_string()))?;
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_CAPACITY);

        Ok(Self {
            data_provider: Arc::new(data_provider),
            task: Arc::new(task),
            scorers,
            config,
            store: None,
            show_progress_bar: true,
            progress_tx,
        })
    }

    /// Attach the store used when the config names a project.
    pub fn with_store(mut self, store: Arc<dyn EvalStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress_bar = show;
        self
    }

    /// Receive an [`EvalProgress`] event at start and after every completed item.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<EvalProgress> {
        self.progress_tx.subscribe()
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Run every item through the task and scorers.
    ///
    /// Fails with the first error raised by the dataset, the task, a scorer,
    /// the results file or the store. Units already scheduled when one fails
    /// keep running but their results are discarded, and a persisted run is
    /// marked failed.
    pub async fn evaluate(&self) -> Result<EvalOutcome<S>> {
        let dataset = self.data_provider.load().await.map_err(EvalError::Dataset)?;
        let total = dataset.len();
        let store = self.resolve_store()?;

        let run = match store {
            Some(store) => Some(self.start_run(store, total).await?),
            None => None,
        };
        let run_id = run.as_ref().map(|run| run.id);

        info!(
            eval = %self.config.name,
            items = total,
            max_concurrency = self.config.max_concurrency,
            run_id = ?run_id,
            "Starting evaluation"
        );

        match self.execute(dataset, run.clone()).await {
            Ok(scores) => {
                info!(eval = %self.config.name, items = total, "Evaluation completed");
                Ok(EvalOutcome { scores, run_id })
            }
            Err(e) => {
                error!(eval = %self.config.name, error = %e, "Evaluation failed");
                if let Some(run) = &run {
                    run.mark_failed().await;
                }
                Err(e)
            }
        }
    }

    fn resolve_store(&self) -> Result<Option<Arc<dyn EvalStore>>> {
        match (&self.config.project_name, &self.store) {
            (None, _) => Ok(None),
            (Some(_), Some(store)) => Ok(Some(store.clone())),
            (Some(project), None) => Err(EvalError::Config(format!(
                "project \"{}\" is set but no eval store is attached",
                project
            ))),
        }
    }

    async fn start_run(&self, store: Arc<dyn EvalStore>, total: usize) -> Result<Arc<ActiveRun>> {
        let project_name = self.config.project_name.as_deref().unwrap_or_default();

        let context = store
            .find_or_create_context(
                project_name,
                &self.config.name,
                self.config.eval_description.as_deref(),
            )
            .await
            .inspect_err(|e| error!(error = %e, "Failed to set up eval context"))?;

        let run = store
            .create_run(NewEvalRun {
                eval_name_id: context.eval_name.id,
                max_concurrency: to_u32(self.config.max_concurrency),
                total_items: to_u32(total),
                output_dir: self
                    .config
                    .output_dir
                    .as_ref()
                    .map(|dir| dir.display().to_string()),
            })
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create eval run"))?;

        Ok(Arc::new(ActiveRun {
            id: run.id,
            store,
            failed: AtomicBool::new(false),
            persisted_progress: Mutex::new(0),
        }))
    }

    async fn execute(
        &self,
        dataset: Vec<DataItem<I, E>>,
        run: Option<Arc<ActiveRun>>,
    ) -> Result<Vec<Vec<S>>> {
        let total = dataset.len();
        let progress = ProgressReporter::start(
            &self.config.name,
            total,
            self.show_progress_bar,
            self.progress_tx.clone(),
        );

        let writer = match self.config.output_file_path() {
            Some(path) => Some(JsonlWriter::create(path).await?),
            None => None,
        };

        let ctx = Arc::new(UnitContext {
            task: self.task.clone(),
            scorers: self.scorers.clone().into(),
            total,
            limiter: ConcurrencyLimiter::new(self.config.max_concurrency),
            completed: AtomicUsize::new(0),
            halted: AtomicBool::new(false),
            rows: Mutex::new(Vec::with_capacity(if run.is_some() { total } else { 0 })),
            progress,
            writer,
            run,
        });

        let (results_tx, mut results) = mpsc::unbounded_channel();
        tokio::spawn(ctx.clone().dispatch(dataset, results_tx));

        let mut scores: Vec<Option<Vec<S>>> = (0..total).map(|_| None).collect();
        for _ in 0..total {
            let failure = match results.recv().await {
                Some((index, Ok(item_scores))) => {
                    scores[index] = Some(item_scores);
                    continue;
                }
                Some((_, Err(e))) => e,
                None => EvalError::UnitLost,
            };

            ctx.halted.store(true, Ordering::SeqCst);
            ctx.progress.abandon();
            return Err(failure);
        }
        ctx.progress.finish();

        if let Some(run) = &ctx.run {
            let mut rows = std::mem::take(&mut *ctx.rows.lock().await);
            rows.sort_by_key(|row| row.item_index);
            run.complete(rows).await?;
        }

        Ok(scores.into_iter().flatten().collect())
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
