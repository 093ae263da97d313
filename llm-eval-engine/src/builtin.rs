use async_trait::async_trait;
use llm_eval_core::domain::{DataItem, EvalScore};
use llm_eval_scorers::{
    score_json_diff, score_string_diff, score_string_exact, JSON_DIFF, STRING_DIFF, STRING_EXACT,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::tasks::EvalScorer;

/// The reference scorers, comparing an item's `expected` value to the output.
///
/// String scorers compare JSON strings by their contents and any other value
/// by its JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinScorer {
    StringDiff,
    StringExact,
    JsonDiff,
}

impl BuiltinScorer {
    pub const ALL: [BuiltinScorer; 3] = [
        BuiltinScorer::StringDiff,
        BuiltinScorer::StringExact,
        BuiltinScorer::JsonDiff,
    ];

    /// Name of the score this scorer produces.
    pub fn score_name(&self) -> &'static str {
        match self {
            BuiltinScorer::StringDiff => STRING_DIFF,
            BuiltinScorer::StringExact => STRING_EXACT,
            BuiltinScorer::JsonDiff => JSON_DIFF,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinScorer::StringDiff => "string-diff",
            BuiltinScorer::StringExact => "string-exact",
            BuiltinScorer::JsonDiff => "json-diff",
        }
    }

    /// Score already-serialized values.
    pub fn score_values(&self, expected: &Value, actual: &Value) -> EvalScore {
        match self {
            BuiltinScorer::StringDiff => {
                score_string_diff(&text_of(expected), &text_of(actual)).into()
            }
            BuiltinScorer::StringExact => {
                score_string_exact(&text_of(expected), &text_of(actual)).into()
            }
            BuiltinScorer::JsonDiff => score_json_diff(expected, actual).into(),
        }
    }
}

impl fmt::Display for BuiltinScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuiltinScorer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "string-diff" => Ok(BuiltinScorer::StringDiff),
            "string-exact" => Ok(BuiltinScorer::StringExact),
            "json-diff" => Ok(BuiltinScorer::JsonDiff),
            other => Err(format!(
                "unknown scorer '{}' (expected one of: string-diff, string-exact, json-diff)",
                other
            )),
        }
    }
}

#[async_trait]
impl<I, E, O> EvalScorer<I, E, O, EvalScore> for BuiltinScorer
where
    I: Send + Sync + 'static,
    E: Serialize + Send + Sync + 'static,
    O: Serialize + Send + Sync + 'static,
{
    async fn score(&self, output: Arc<O>, item: Arc<DataItem<I, E>>) -> anyhow::Result<EvalScore> {
        let expected = item
            .expected
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("{} needs an expected value", self.score_name()))?;

        let expected = serde_json::to_value(expected)?;
        let actual = serde_json::to_value(output.as_ref())?;
        Ok(self.score_values(&expected, &actual))
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
