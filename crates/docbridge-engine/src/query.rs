//! In-memory query evaluation.
//!
//! The backing store is never asked to filter or sort: `list` loads the whole
//! collection and evaluates the query here.

use std::cmp::Ordering;

use docbridge_types::{document_id, Document, Filter, ListParams, OperationResult, Pagination, ReferenceParams, Sort, SortOrder};
use serde_json::Value;
use tracing::debug;

use crate::context::ResourceContext;
use crate::error::{EngineError, EngineResult};

/// One page of a list query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListPage {
    pub data: Vec<Document>,
    pub ids: Vec<String>,
    /// Size of the filtered set before pagination.
    pub total: usize,
}

impl From<ListPage> for OperationResult {
    fn from(page: ListPage) -> Self {
        OperationResult::List {
            data: page.data,
            ids: page.ids,
            total: page.total,
        }
    }
}

/// Load every record of the resource as `(storage key, record)` pairs, in
/// key order, with `id` filled from the key where missing.
pub async fn load_records(ctx: &ResourceContext<'_>) -> EngineResult<Vec<(String, Document)>> {
    let snapshots = ctx.documents().list(ctx.collection()).await?;
    Ok(snapshots
        .into_iter()
        .map(|snap| (snap.key.clone(), snap.into_record()))
        .collect())
}

/// Filter, sort, and paginate the resource's records.
pub async fn list(ctx: &ResourceContext<'_>, params: &ListParams) -> EngineResult<ListPage> {
    let pagination = params
        .pagination
        .ok_or_else(|| EngineError::Validation("pagination is required".into()))?;
    let records = load_records(ctx).await?;
    let loaded = records.len();
    let page = evaluate(records, params.filter.as_ref(), params.sort.as_ref(), pagination);
    debug!(
        resource = %ctx.resource.name,
        loaded,
        total = page.total,
        returned = page.data.len(),
        "list evaluated"
    );
    Ok(page)
}

/// Pure query evaluation over loaded records.
pub fn evaluate(
    mut records: Vec<(String, Document)>,
    filter: Option<&Filter>,
    sort: Option<&Sort>,
    pagination: Pagination,
) -> ListPage {
    if let Some(filter) = filter {
        records.retain(|(_, record)| matches_filter(record, filter));
    }
    if let Some(sort) = sort {
        sort_records(&mut records, sort);
    }
    let total = records.len();
    let (start, end) = pagination.bounds(total);
    let (ids, data): (Vec<String>, Vec<Document>) = records
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(|(key, record)| (document_id(&record).unwrap_or(key), record))
        .unzip();
    ListPage { data, ids, total }
}

/// `true` iff the record equals the filter on every key. A record lacking a
/// filtered field never matches.
pub fn matches_filter(record: &Document, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| record.get(field).is_some_and(|actual| values_equal(actual, expected)))
}

/// JSON equality with numbers compared by value (`1 == 1.0`).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Stable sort on `sort.field`; ties fall back to the storage key.
pub fn sort_records(records: &mut [(String, Document)], sort: &Sort) {
    records.sort_by(|(key_a, a), (key_b, b)| {
        let ord = compare_values(a.get(&sort.field), b.get(&sort.field));
        let ord = match sort.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        };
        ord.then_with(|| key_a.cmp(key_b))
    });
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total order over optional JSON values: missing/null < booleans < numbers
/// < strings < arrays < objects. Objects compare equal to each other.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => x
            .iter()
            .zip(y.iter())
            .map(|(a, b)| compare_values(Some(a), Some(b)))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Read one record. A missing id, an id that could never have been written,
/// and a missing document are all not-found.
pub async fn get_one(ctx: &ResourceContext<'_>, id: &str) -> EngineResult<Document> {
    if id.is_empty() {
        return Err(EngineError::NotFound(format!("{}: id is required", ctx.resource.name)));
    }
    if id.contains('/') {
        return Err(EngineError::NotFound(ctx.resource.document_path(id)));
    }
    let snapshot = ctx
        .documents()
        .get(ctx.collection(), id)
        .await?
        .ok_or_else(|| EngineError::NotFound(ctx.resource.document_path(id)))?;
    Ok(snapshot.into_record())
}

/// Read several records one after another, in the order of `ids`.
pub async fn get_many(ctx: &ResourceContext<'_>, ids: &[String]) -> EngineResult<Vec<Document>> {
    let mut data = Vec::with_capacity(ids.len());
    for id in ids {
        data.push(get_one(ctx, id).await?);
    }
    Ok(data)
}

/// List the records whose `target` field equals the referenced id.
pub async fn get_many_reference(ctx: &ResourceContext<'_>, params: &ReferenceParams) -> EngineResult<ListPage> {
    let target = params
        .target
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| EngineError::Validation("reference target is required".into()))?;
    if params.id.is_null() {
        return Err(EngineError::Validation(format!(
            "reference id is required for target {target}"
        )));
    }
    let mut list_params = params.list.clone();
    list_params
        .filter
        .get_or_insert_with(Filter::new)
        .insert(target.to_string(), params.id.clone());
    list(ctx, &list_params).await
}
