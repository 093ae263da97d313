use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{EvalNameId, ProjectId};

/// A project groups eval names. Created through the dashboard, never by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One kind of evaluation inside a project; runs hang off it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalName {
    pub id: EvalNameId,
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvalName {
    pub fn new(project_id: ProjectId, name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EvalNameId::new(),
            project_id,
            name: name.into(),
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Resolved persistence context of an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalContext {
    pub project: Project,
    pub eval_name: EvalName,
}
