use llm_eval_core::domain::{DataItem, Metadata};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One line of the results file.
#[derive(Debug, Serialize)]
pub struct JsonlRecord<'a, I, E, O, S> {
    pub scores: &'a [S],
    pub index: usize,
    pub input: &'a I,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<&'a E>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a Metadata>,
    pub output: &'a O,
}

impl<'a, I, E, O, S> JsonlRecord<'a, I, E, O, S> {
    pub fn new(index: usize, item: &'a DataItem<I, E>, output: &'a O, scores: &'a [S]) -> Self {
        Self {
            scores,
            index,
            input: &item.input,
            expected: item.expected.as_ref(),
            metadata: item.metadata.as_ref(),
            output,
        }
    }
}

/// Append-only JSONL file shared by concurrent units.
///
/// Each record goes out as one `write_all` of a full line under the file lock,
/// so lines never interleave. Line order is completion order.
pub struct JsonlWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlWriter {
    /// Creates parent directories and truncates any existing file.
    pub async fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;

        tracing::debug!(path = %path.display(), "Results file created");

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append<T: Serialize>(&self, record: &T) -> crate::error::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
