use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named numeric metric produced by a scorer for one item.
///
/// Implementors may carry extra fields (details, breakdowns); they survive
/// serialization and are folded into [`EvalScore::extra`] when persisted.
pub trait Score: Serialize + Send + Sync {
    fn name(&self) -> &str;
    fn value(&self) -> f64;

    /// Convert into the storage shape: `name`, `value`, plus every other
    /// serialized field of the score.
    fn to_eval_score(&self) -> EvalScore {
        let extra = match serde_json::to_value(self) {
            Ok(Value::Object(mut fields)) => {
                fields.remove("name");
                fields.remove("value");
                fields
            }
            _ => Map::new(),
        };

        EvalScore {
            name: self.name().to_string(),
            value: self.value(),
            extra,
        }
    }
}

/// Untyped score as stored alongside a result row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalScore {
    pub name: String,
    pub value: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EvalScore {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Score for EvalScore {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn to_eval_score(&self) -> EvalScore {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct DetailedScore {
        name: String,
        value: f64,
        details: Value,
    }

    impl Score for DetailedScore {
        fn name(&self) -> &str {
            &self.name
        }

        fn value(&self) -> f64 {
            self.value
        }
    }

    #[test]
    fn extra_fields_are_kept() {
        let score = DetailedScore {
            name: "custom".to_string(),
            value: 0.5,
            details: json!({"hits": 3}),
        };

        let stored = score.to_eval_score();
        assert_eq!(stored.name, "custom");
        assert_eq!(stored.value, 0.5);
        assert_eq!(stored.extra.get("details"), Some(&json!({"hits": 3})));
        assert!(!stored.extra.contains_key("name"));
    }

    #[test]
    fn eval_score_flattens_on_the_wire() {
        let score = EvalScore::new("accuracy", 1.0).with_field("note", json!("ok"));
        let value = serde_json::to_value(&score).unwrap();
        assert_eq!(value, json!({"name": "accuracy", "value": 1.0, "note": "ok"}));
    }
}
