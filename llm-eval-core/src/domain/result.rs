use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::data_item::{DataItem, Metadata};
use super::ids::{EvalResultId, EvalRunId};
use super::score::{EvalScore, Score};
use crate::error::Result;

/// Result row accumulated in memory during a run and persisted in bulk at the end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEvalResult {
    pub eval_run_id: EvalRunId,
    pub item_index: u32,
    pub input: Value,
    pub expected: Option<Value>,
    pub output: Value,
    pub scores: Vec<EvalScore>,
    pub metadata: Option<Metadata>,
}

impl NewEvalResult {
    /// Build the storage row for one processed item.
    pub fn from_item<I, E, O, S>(
        eval_run_id: EvalRunId,
        item_index: u32,
        item: &DataItem<I, E>,
        output: &O,
        scores: &[S],
    ) -> Result<Self>
    where
        I: Serialize,
        E: Serialize,
        O: Serialize,
        S: Score,
    {
        let expected = match &item.expected {
            Some(expected) => Some(to_record_value(expected)?),
            None => None,
        };

        Ok(Self {
            eval_run_id,
            item_index,
            input: to_record_value(&item.input)?,
            expected,
            output: to_record_value(output)?,
            scores: scores.iter().map(Score::to_eval_score).collect(),
            metadata: item.metadata.clone(),
        })
    }
}

/// A persisted result row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalResult {
    pub id: EvalResultId,
    pub eval_run_id: EvalRunId,
    pub item_index: u32,
    pub input: Value,
    pub expected: Option<Value>,
    pub output: Value,
    pub scores: Vec<EvalScore>,
    pub metadata: Option<Metadata>,
    pub created_at: DateTime<Utc>,
}

impl From<NewEvalResult> for EvalResult {
    fn from(row: NewEvalResult) -> Self {
        Self {
            id: EvalResultId::new(),
            eval_run_id: row.eval_run_id,
            item_index: row.item_index,
            input: row.input,
            expected: row.expected,
            output: row.output,
            scores: row.scores,
            metadata: row.metadata,
            created_at: Utc::now(),
        }
    }
}

/// Paging for listing the results of a run (always ordered by item index).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultQuery {
    pub limit: i64,
    pub offset: i64,
}

impl Default for ResultQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

/// Shape a value for a JSON column: objects and arrays pass through,
/// `null` becomes `{}` and any other scalar is wrapped as `{"value": x}`.
pub fn to_record_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    let value = serde_json::to_value(value)?;
    Ok(match value {
        Value::Object(_) | Value::Array(_) => value,
        Value::Null => Value::Object(Map::new()),
        scalar => {
            let mut wrapped = Map::new();
            wrapped.insert("value".to_string(), scalar);
            Value::Object(wrapped)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_wrapped() {
        assert_eq!(to_record_value(&42).unwrap(), json!({"value": 42}));
        assert_eq!(to_record_value("hi").unwrap(), json!({"value": "hi"}));
        assert_eq!(to_record_value(&true).unwrap(), json!({"value": true}));
    }

    #[test]
    fn objects_pass_through() {
        let value = json!({"a": 1});
        assert_eq!(to_record_value(&value).unwrap(), value);
    }

    #[test]
    fn null_becomes_empty_object() {
        assert_eq!(to_record_value(&Value::Null).unwrap(), json!({}));
        assert_eq!(to_record_value(&Option::<i32>::None).unwrap(), json!({}));
    }
}
