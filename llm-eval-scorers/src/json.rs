//! Structural, field-by-field comparison of JSON values.
//!
//! Every leaf (primitive, `null`, missing key or index) counts as one field.
//! The score is `matching_fields / total_fields`, and `0` when there is
//! nothing to compare (`{}` against `{}`): emptiness is not a perfect match.
//!
//! `serde_json::Value` owns its children, so inputs are always finite trees.

use llm_eval_core::{EvalScore, Score};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JSON_DIFF: &str = "json_diff";

const ROOT_PATH: &str = "root";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JsonDiffDetails {
    pub differences: Vec<String>,
    pub total_fields: usize,
    pub matching_fields: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonDiffScore {
    pub name: String,
    pub value: f64,
    pub details: JsonDiffDetails,
}

impl Score for JsonDiffScore {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value
    }
}

impl From<JsonDiffScore> for EvalScore {
    fn from(score: JsonDiffScore) -> Self {
        score.to_eval_score()
    }
}

pub fn score_json_diff(expected: &Value, actual: &Value) -> JsonDiffScore {
    let mut details = JsonDiffDetails::default();
    compare(expected, actual, "", &mut details);

    let value = if details.total_fields > 0 {
        details.matching_fields as f64 / details.total_fields as f64
    } else {
        0.0
    };

    JsonDiffScore {
        name: JSON_DIFF.to_string(),
        value,
        details,
    }
}

fn compare(expected: &Value, actual: &Value, path: &str, acc: &mut JsonDiffDetails) {
    match (expected, actual) {
        (Value::Null, Value::Null) => {
            acc.total_fields += 1;
            acc.matching_fields += 1;
        }
        (Value::Null, _) | (_, Value::Null) => {
            acc.total_fields += 1;
            acc.differences.push(format!(
                "{}: expected {}, got {}",
                display_path(path),
                format_value(expected),
                format_value(actual)
            ));
        }
        (Value::Array(exp), Value::Array(act)) => compare_arrays(exp, act, path, acc),
        (Value::Object(exp), Value::Object(act)) => compare_objects(exp, act, path, acc),
        _ if type_name(expected) != type_name(actual) => {
            acc.total_fields += 1;
            acc.differences.push(format!(
                "{}: type mismatch - expected {}, got {}",
                display_path(path),
                type_name(expected),
                type_name(actual)
            ));
        }
        _ => {
            acc.total_fields += 1;
            if primitives_equal(expected, actual) {
                acc.matching_fields += 1;
            } else {
                acc.differences.push(format!(
                    "{}: expected {}, got {}",
                    display_path(path),
                    format_value(expected),
                    format_value(actual)
                ));
            }
        }
    }
}

fn compare_arrays(expected: &[Value], actual: &[Value], path: &str, acc: &mut JsonDiffDetails) {
    let len = expected.len().max(actual.len());
    for i in 0..len {
        let current = format!("{}[{}]", path, i);
        match (expected.get(i), actual.get(i)) {
            (Some(exp), Some(act)) => compare(exp, act, &current, acc),
            (None, _) => {
                acc.total_fields += 1;
                acc.differences.push(format!("{}: missing in expected", current));
            }
            (_, None) => {
                acc.total_fields += 1;
                acc.differences.push(format!("{}: missing in actual", current));
            }
        }
    }
}

/// Visits the keys of `expected`, then the keys only `actual` has, each in
/// `serde_json::Map` order (sorted by key).
fn compare_objects(
    expected: &Map<String, Value>,
    actual: &Map<String, Value>,
    path: &str,
    acc: &mut JsonDiffDetails,
) {
    let keys = expected
        .keys()
        .chain(actual.keys().filter(|key| !expected.contains_key(*key)));

    for key in keys {
        let current = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };

        match (expected.get(key), actual.get(key)) {
            (Some(exp), Some(act)) => compare(exp, act, &current, acc),
            (None, _) => {
                acc.total_fields += 1;
                acc.differences
                    .push(format!("{}: unexpected property in actual", current));
            }
            (_, None) => {
                acc.total_fields += 1;
                acc.differences
                    .push(format!("{}: missing property in actual", current));
            }
        }
    }
}

/// Numbers compare by value so that `1` and `1.0` match.
fn primitives_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        _ => expected == actual,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strings render raw, containers as JSON text, everything else via `Display`.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        ROOT_PATH
    } else {
        path
    }
}
