use serde::{Deserialize, Serialize};

/// Free-form metadata attached to a dataset row.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One dataset row. Its position in the dataset is its item index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataItem<I, E> {
    pub input: I,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<E>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl<I, E> DataItem<I, E> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            expected: None,
            metadata: None,
        }
    }

    pub fn with_expected(mut self, expected: E) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
