use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{id_from_value, Document};
use crate::error::TypeError;
use crate::query::{ListParams, ReferenceParams};

/// The closed set of protocol operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    List,
    GetOne,
    GetMany,
    GetManyReference,
    Create,
    Update,
    Delete,
    DeleteMany,
}

impl OperationKind {
    pub const ALL: [Self; 8] = [
        Self::List,
        Self::GetOne,
        Self::GetMany,
        Self::GetManyReference,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::DeleteMany,
    ];

    /// Protocol tag, e.g. `GET_LIST`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "GET_LIST",
            Self::GetOne => "GET_ONE",
            Self::GetMany => "GET_MANY",
            Self::GetManyReference => "GET_MANY_REFERENCE",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::DeleteMany => "DELETE_MANY",
        }
    }

    /// Parse a protocol tag. Case-insensitive; `-` and `_` are
    /// interchangeable and `list` is accepted for `GET_LIST`.
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "GET_LIST" | "LIST" => Some(Self::List),
            "GET_ONE" => Some(Self::GetOne),
            "GET_MANY" => Some(Self::GetMany),
            "GET_MANY_REFERENCE" => Some(Self::GetManyReference),
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "DELETE_MANY" => Some(Self::DeleteMany),
            _ => None,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Create | Self::Update | Self::Delete | Self::DeleteMany
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of `create` and `update`.
///
/// `id` and `key` are kept as raw JSON values; identifier resolution decides
/// which of them, if any, names the record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default)]
    pub data: Document,
}

impl WriteParams {
    pub fn new(data: Document) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<Value>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// A protocol request, one variant per operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    List(ListParams),
    GetOne { id: String },
    GetMany { ids: Vec<String> },
    GetManyReference(ReferenceParams),
    Create(WriteParams),
    Update(WriteParams),
    Delete { id: String },
    DeleteMany { ids: Vec<String> },
}

#[derive(Deserialize)]
struct IdParams {
    #[serde(default)]
    id: Value,
}

#[derive(Deserialize)]
struct IdsParams {
    #[serde(default)]
    ids: Vec<Value>,
}

impl Request {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::List(_) => OperationKind::List,
            Self::GetOne { .. } => OperationKind::GetOne,
            Self::GetMany { .. } => OperationKind::GetMany,
            Self::GetManyReference(_) => OperationKind::GetManyReference,
            Self::Create(_) => OperationKind::Create,
            Self::Update(_) => OperationKind::Update,
            Self::Delete { .. } => OperationKind::Delete,
            Self::DeleteMany { .. } => OperationKind::DeleteMany,
        }
    }

    /// Build a request from JSON protocol params.
    ///
    /// `null` params are read as an empty object. A `GET_ONE` without an id
    /// parses to an empty id so the read can fail as not-found; a `DELETE`
    /// without an id is rejected here.
    pub fn from_params(kind: OperationKind, params: Value) -> Result<Self, TypeError> {
        let params = match params {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let request = match kind {
            OperationKind::List => Self::List(parse(kind, params)?),
            OperationKind::GetOne => {
                let p: IdParams = parse(kind, params)?;
                Self::GetOne {
                    id: id_from_value(&p.id).unwrap_or_default(),
                }
            }
            OperationKind::GetMany => Self::GetMany {
                ids: parse_ids(kind, params)?,
            },
            OperationKind::GetManyReference => Self::GetManyReference(parse(kind, params)?),
            OperationKind::Create => Self::Create(parse(kind, params)?),
            OperationKind::Update => Self::Update(parse(kind, params)?),
            OperationKind::Delete => {
                let p: IdParams = parse(kind, params)?;
                let id = id_from_value(&p.id).ok_or_else(|| TypeError::InvalidParams {
                    operation: kind.as_str(),
                    reason: "id is required".into(),
                })?;
                Self::Delete { id }
            }
            OperationKind::DeleteMany => Self::DeleteMany {
                ids: parse_ids(kind, params)?,
            },
        };
        Ok(request)
    }
}

fn parse<T: DeserializeOwned>(kind: OperationKind, params: Value) -> Result<T, TypeError> {
    serde_json::from_value(params).map_err(|e| TypeError::InvalidParams {
        operation: kind.as_str(),
        reason: e.to_string(),
    })
}

fn parse_ids(kind: OperationKind, params: Value) -> Result<Vec<String>, TypeError> {
    let p: IdsParams = parse(kind, params)?;
    p.ids
        .iter()
        .map(|v| {
            id_from_value(v).ok_or_else(|| TypeError::InvalidParams {
                operation: kind.as_str(),
                reason: format!("not an identifier: {v}"),
            })
        })
        .collect()
}
