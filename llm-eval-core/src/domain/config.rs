use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;

/// Suffix appended to the eval name to build the JSONL results file name.
pub const RESULTS_FILE_SUFFIX: &str = "-evaluation-results.jsonl";

// ===== Eval Configuration =====

/// Configuration of one evaluation. Immutable once handed to an engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct EvalConfig {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1))]
    pub max_concurrency: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_description: Option<String>,
}

impl EvalConfig {
    pub fn new(name: impl Into<String>, max_concurrency: usize) -> Self {
        Self {
            name: name.into(),
            max_concurrency,
            output_dir: None,
            project_name: None,
            eval_description: None,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_project(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.eval_description = Some(description.into());
        self
    }

    /// Validate and return the config, mapping failures to `CoreError::Validation`.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Whether results should be persisted through an `EvalStore`.
    pub fn persists(&self) -> bool {
        self.project_name.is_some()
    }

    /// Path of the JSONL results file, if an output directory is configured.
    pub fn output_file_path(&self) -> Option<PathBuf> {
        self.output_dir
            .as_deref()
            .map(|dir| results_file_path(dir, &self.name))
    }
}

/// `<dir>/<name>-evaluation-results.jsonl`
pub fn results_file_path(dir: &Path, eval_name: &str) -> PathBuf {
    dir.join(format!("{}{}", eval_name, RESULTS_FILE_SUFFIX))
}
