use llm_eval_core::domain::{EvalRunId, EvalScore, NewEvalResult, NewEvalRun, EvalNameId};
use serde_json::json;
use uuid::Uuid;

/// Generate a unique name to avoid conflicts between tests sharing a database
pub fn unique_test_name(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

pub fn new_run(eval_name_id: EvalNameId, total_items: u32) -> NewEvalRun {
    NewEvalRun {
        eval_name_id,
        max_concurrency: 2,
        total_items,
        output_dir: None,
    }
}

/// Result rows for `indices`, each with one `exact` score
pub fn result_rows(run_id: EvalRunId, indices: impl IntoIterator<Item = u32>) -> Vec<NewEvalResult> {
    indices
        .into_iter()
        .map(|index| NewEvalResult {
            eval_run_id: run_id,
            item_index: index,
            input: json!({"value": index}),
            expected: Some(json!({"value": index * 2})),
            output: json!({"value": index * 2}),
            scores: vec![EvalScore::new("exact", 1.0)],
            metadata: None,
        })
        .collect()
}
