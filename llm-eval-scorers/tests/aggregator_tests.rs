use approx::assert_relative_eq;
use llm_eval_core::EvalScore;
use llm_eval_scorers::aggregators::{ScoreAggregator, ScoreStats};
use llm_eval_scorers::{score_string_diff, StringDiffScore};

// ===== Average Tests =====

#[test]
fn test_average_basic() {
    assert_eq!(ScoreAggregator::average(&[1.0, 2.0, 3.0]), Some(2.0));
    assert_eq!(ScoreAggregator::average(&[0.5]), Some(0.5));
}

#[test]
fn test_average_empty() {
    assert_eq!(ScoreAggregator::average(&[]), None);
    assert!(ScoreAggregator::summarize(&[]).is_none());
}

#[test]
fn test_summarize() {
    let summary = ScoreAggregator::summarize(&[0.2, 1.0, 0.6]).unwrap();

    assert_relative_eq!(summary.mean, 0.6, epsilon = 1e-12);
    assert_eq!(summary.min, 0.2);
    assert_eq!(summary.max, 1.0);
    assert_eq!(summary.count, 3);
}

// ===== ScoreStats Tests =====

#[test]
fn test_score_stats_groups_by_name() {
    let scores = vec![
        vec![EvalScore::new("exact", 1.0), EvalScore::new("diff", 0.5)],
        vec![EvalScore::new("exact", 0.0), EvalScore::new("diff", 1.0)],
    ];

    let stats = ScoreStats::from_scores(&scores);

    assert_eq!(stats.average("exact"), Some(0.5));
    assert_eq!(stats.average("diff"), Some(0.75));
    assert_eq!(stats.summaries["diff"].count, 2);
    assert_eq!(stats.average("missing"), None);
}

#[test]
fn test_score_stats_typed_scores() {
    let scores: Vec<Vec<StringDiffScore>> = vec![
        vec![score_string_diff("hello", "hallo")],
        vec![score_string_diff("same", "same")],
    ];

    let stats = ScoreStats::from_scores(&scores);
    assert_relative_eq!(stats.average("string_diff").unwrap(), 0.9, epsilon = 1e-12);
}

#[test]
fn test_score_stats_empty_run() {
    let stats = ScoreStats::from_scores::<EvalScore>(&[]);
    assert!(stats.is_empty());

    let no_scorers: Vec<Vec<EvalScore>> = vec![vec![], vec![]];
    assert!(ScoreStats::from_scores(&no_scorers).is_empty());
}
