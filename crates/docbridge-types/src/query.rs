use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Equality filter: every entry must match for a record to be kept.
pub type Filter = Map<String, Value>;

/// 1-indexed page selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    #[serde(rename = "perPage")]
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// Half-open `[start, end)` bounds of this page within `len` items.
    ///
    /// Page 0 is treated as page 1. Both bounds are clamped to `len`.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let page = self.page.max(1);
        let start = (page - 1).saturating_mul(self.per_page).min(len);
        let end = page.saturating_mul(self.per_page).min(len);
        (start, end)
    }
}

/// Sort direction. Anything other than `DESC` sorts ascending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<String> for SortOrder {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.to_string()
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Parameters of a `list` query.
///
/// `pagination` is optional at the type level so that a request without it
/// can be rejected with a validation error rather than a parse error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub filter: Option<Filter>,
}

impl ListParams {
    pub fn page(page: usize, per_page: usize) -> Self {
        Self {
            pagination: Some(Pagination::new(page, per_page)),
            ..Default::default()
        }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn filtered(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter
            .get_or_insert_with(Filter::new)
            .insert(field.into(), value.into());
        self
    }
}

/// Parameters of a `get-many-reference` query: a list query narrowed to
/// records whose `target` field equals `id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceParams {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub id: Value,
    #[serde(flatten)]
    pub list: ListParams,
}

impl ReferenceParams {
    pub fn new(target: impl Into<String>, id: impl Into<Value>, list: ListParams) -> Self {
        Self {
            target: Some(target.into()),
            id: id.into(),
            list,
        }
    }
}
