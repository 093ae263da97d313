use llm_eval_core::Score;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one scorer's values across a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Per-scorer statistics of a finished run, keyed by score name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreStats {
    pub averages: BTreeMap<String, f64>,
    pub summaries: BTreeMap<String, ScoreSummary>,
}

impl ScoreStats {
    /// Group every score by name and summarize each group.
    pub fn from_scores<S: Score>(scores: &[Vec<S>]) -> Self {
        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for item_scores in scores {
            for score in item_scores {
                grouped
                    .entry(score.name().to_string())
                    .or_default()
                    .push(score.value());
            }
        }

        let mut stats = Self::default();
        for (name, values) in grouped {
            if let Some(summary) = ScoreAggregator::summarize(&values) {
                stats.averages.insert(name.clone(), summary.mean);
                stats.summaries.insert(name, summary);
            }
        }
        stats
    }

    pub fn average(&self, name: &str) -> Option<f64> {
        self.averages.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }
}

pub struct ScoreAggregator;

impl ScoreAggregator {
    /// Arithmetic mean; `None` for an empty slice.
    pub fn average(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn summarize(values: &[f64]) -> Option<ScoreSummary> {
        let mean = Self::average(values)?;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Some(ScoreSummary {
            mean,
            min,
            max,
            count: values.len(),
        })
    }
}
