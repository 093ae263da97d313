use llm_eval_core::{EvalScore, Score};
use serde::{Deserialize, Serialize};

pub const STRING_DIFF: &str = "string_diff";
pub const STRING_EXACT: &str = "string_exact";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StringDiffDetails {
    pub levenshtein_distance: usize,
    pub similarity: f64,
    pub expected_length: usize,
    pub actual_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StringDiffScore {
    pub name: String,
    pub value: f64,
    pub details: StringDiffDetails,
}

impl Score for StringDiffScore {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value
    }
}

impl From<StringDiffScore> for EvalScore {
    fn from(score: StringDiffScore) -> Self {
        score.to_eval_score()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StringExactScore {
    pub name: String,
    pub value: f64,
}

impl Score for StringExactScore {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value
    }
}

impl From<StringExactScore> for EvalScore {
    fn from(score: StringExactScore) -> Self {
        score.to_eval_score()
    }
}

/// Single-character edit distance (insert, delete, substitute; each costs 1).
///
/// Works on `char`s and keeps only two rows of the DP matrix.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Similarity `1 - distance / max(len)`; two empty strings are a perfect match.
pub fn score_string_diff(expected: &str, actual: &str) -> StringDiffScore {
    let distance = levenshtein_distance(expected, actual);
    let expected_length = expected.chars().count();
    let actual_length = actual.chars().count();
    let max_length = expected_length.max(actual_length);

    let similarity = if max_length == 0 {
        1.0
    } else {
        1.0 - distance as f64 / max_length as f64
    };

    StringDiffScore {
        name: STRING_DIFF.to_string(),
        value: similarity,
        details: StringDiffDetails {
            levenshtein_distance: distance,
            similarity,
            expected_length,
            actual_length,
        },
    }
}

/// Case- and whitespace-sensitive equality: 1 or 0.
pub fn score_string_exact(expected: &str, actual: &str) -> StringExactScore {
    StringExactScore {
        name: STRING_EXACT.to_string(),
        value: if expected == actual { 1.0 } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("sitting", "kitten"), 3);
    }

    #[test]
    fn distance_against_empty() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", ""), 0);
    }
}
