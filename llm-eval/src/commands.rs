//! Subcommands

use anyhow::{Context as _, Result};
use clap::Args;
use llm_eval_core::domain::{DataItem, EvalConfig, EvalScore};
use llm_eval_engine::{scorer, BoxedScorer, BuiltinScorer, EvalOutcome, Evaluation};
use llm_eval_storage::postgres::{create_pool, create_pool_with_config, migrate, PostgresConfig};
use llm_eval_storage::PgEvalStore;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::dataset::JsonlDataset;

/// Score recorded outputs against expected values
#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// JSONL dataset; each row's `input` is the recorded output to score
    pub dataset: PathBuf,

    /// Evaluation name (defaults to the dataset file stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Scorers to apply (string-diff, string-exact, json-diff)
    #[arg(short, long = "scorer", value_delimiter = ',', default_value = "string-diff")]
    pub scorers: Vec<BuiltinScorer>,

    /// Maximum number of items scored at once
    #[arg(short = 'c', long)]
    pub max_concurrency: Option<usize>,

    /// Directory for the JSONL results file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Project to persist results under (must already exist)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Description stored with a newly created eval name
    #[arg(long)]
    pub description: Option<String>,

    /// Database URL, overriding settings
    #[arg(long)]
    pub database_url: Option<String>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl ScoreArgs {
    /// Merge flags over settings into the evaluation config.
    pub fn eval_config(&self, settings: &Settings) -> Result<EvalConfig> {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => self
                .dataset
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .context("cannot derive an eval name from the dataset path; pass --name")?,
        };

        let mut config = EvalConfig::new(
            name,
            self.max_concurrency.unwrap_or(settings.max_concurrency),
        );
        if let Some(dir) = self.output_dir.clone().or_else(|| settings.output_dir.clone()) {
            config = config.with_output_dir(dir);
        }
        if let Some(project) = self.project.clone().or_else(|| settings.project_name.clone()) {
            config = config.with_project(project);
        }
        if let Some(description) = &self.description {
            config = config.with_description(description.clone());
        }
        Ok(config)
    }
}

pub async fn score(args: ScoreArgs, settings: &Settings) -> Result<()> {
    let config = args.eval_config(settings)?;
    let persists = config.persists();

    let replay = |item: Arc<DataItem<Value, Value>>| async move {
        Ok::<_, anyhow::Error>(item.input.clone())
    };
    let scorers: Vec<BoxedScorer<Value, Value, Value, EvalScore>> =
        args.scorers.iter().map(|s| scorer(*s)).collect();

    let mut evaluation = Evaluation::new(JsonlDataset::new(&args.dataset), replay, scorers, config)?
        .with_progress_bar(!args.no_progress);

    if persists {
        let database_url = args
            .database_url
            .clone()
            .or_else(|| settings.database_url.clone())
            .context("a database URL is required to persist results (--database-url or LLM_EVAL_DATABASE_URL)")?;
        // One connection per concurrent unit, capped at 32.
        let max_connections = u32::try_from(evaluation.config().max_concurrency.min(32)).unwrap_or(32);
        let pool = create_pool_with_config(
            &PostgresConfig::new(database_url).with_max_connections(max_connections),
        )
        .await?;
        evaluation = evaluation.with_store(Arc::new(PgEvalStore::new(pool)));
    }

    let outcome = evaluation.evaluate().await?;
    print_summary(&outcome, evaluation.config());
    Ok(())
}

pub async fn migrate_database(database_url: Option<String>, settings: &Settings) -> Result<()> {
    let database_url = database_url
        .or_else(|| settings.database_url.clone())
        .context("a database URL is required (--database-url or LLM_EVAL_DATABASE_URL)")?;

    let pool = create_pool(&database_url).await?;
    migrate(&pool).await?;
    println!("Migrations applied");
    Ok(())
}

fn print_summary(outcome: &EvalOutcome<EvalScore>, config: &EvalConfig) {
    let stats = outcome.stats();

    println!("{}: {} items scored", config.name, outcome.scores.len());
    for (name, summary) in &stats.summaries {
        println!(
            "  {:<14} mean {:.4}  min {:.4}  max {:.4}  (n={})",
            name, summary.mean, summary.min, summary.max, summary.count
        );
    }
    if let Some(path) = config.output_file_path() {
        println!("Results written to {}", path.display());
    }
    if let Some(run_id) = outcome.run_id {
        println!("Stored as run {}", run_id);
    }
}
