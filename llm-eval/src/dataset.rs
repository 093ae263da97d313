use anyhow::Context;
use async_trait::async_trait;
use llm_eval_core::domain::DataItem;
use llm_eval_engine::{DataProvider, Dataset};
use serde_json::Value;
use std::path::PathBuf;

/// JSONL dataset file with one `{input, expected?, metadata?}` object per line.
/// Blank lines are skipped.
#[derive(Debug, Clone)]
pub struct JsonlDataset {
    path: PathBuf,
}

impl JsonlDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub fn parse_dataset(contents: &str) -> anyhow::Result<Dataset<Value, Value>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str::<DataItem<Value, Value>>(line)
                .with_context(|| format!("invalid dataset row on line {}", number + 1))
        })
        .collect()
}

#[async_trait]
impl DataProvider<Value, Value> for JsonlDataset {
    async fn load(&self) -> anyhow::Result<Dataset<Value, Value>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read dataset {}", self.path.display()))?;

        let items = parse_dataset(&contents)?;
        tracing::info!(path = %self.path.display(), items = items.len(), "Dataset loaded");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_rows() {
        let contents = r#"{"input": "a", "expected": "a"}

{"input": {"k": 1}, "metadata": {"tag": "x"}}
"#;
        let items = parse_dataset(contents).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].expected, Some(json!("a")));
        assert_eq!(items[1].input, json!({"k": 1}));
        assert!(items[1].expected.is_none());
        assert_eq!(items[1].metadata.as_ref().unwrap()["tag"], json!("x"));
    }

    #[test]
    fn test_bad_row_names_line() {
        let err = parse_dataset("{\"input\": 1}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dataset = JsonlDataset::new("/nonexistent/dataset.jsonl");
        assert!(dataset.load().await.is_err());
    }
}
