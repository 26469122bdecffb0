use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Per-id outcome of a batch delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub id: String,
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeleteOutcome {
    pub fn deleted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: true,
            error: None,
        }
    }

    pub fn missing(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: false,
            error: None,
        }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: false,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Normalized protocol response. Serializes to the bare `{data, ...}` shape
/// expected by protocol consumers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    /// `get-one`, `create`, `update`.
    One { data: Document },
    /// `list`.
    List {
        data: Vec<Document>,
        ids: Vec<String>,
        total: usize,
    },
    /// `get-many`, and the empty result for unrecognized operations.
    Many { data: Vec<Document> },
    /// `get-many-reference`.
    Reference { data: Vec<Document>, total: usize },
    /// `delete`.
    Deleted { data: String },
    /// `delete-many`: the requested ids plus what happened to each.
    DeletedMany {
        data: Vec<String>,
        outcomes: Vec<DeleteOutcome>,
    },
}

impl OperationResult {
    /// `{data: []}`.
    pub fn empty() -> Self {
        Self::Many { data: Vec::new() }
    }

    /// The single record of a `One` result.
    pub fn record(&self) -> Option<&Document> {
        match self {
            Self::One { data } => Some(data),
            _ => None,
        }
    }

    /// The records of a list-shaped result; empty for other shapes.
    pub fn records(&self) -> &[Document] {
        match self {
            Self::List { data, .. } | Self::Many { data } | Self::Reference { data, .. } => data,
            _ => &[],
        }
    }

    pub fn total(&self) -> Option<usize> {
        match self {
            Self::List { total, .. } | Self::Reference { total, .. } => Some(*total),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Document> {
        match self {
            Self::One { data } => Some(data),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
