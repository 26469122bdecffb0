use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// A record as stored in a collection: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Field holding a record's identifier.
pub const ID_FIELD: &str = "id";

/// Secondary identifier field accepted on writes.
pub const KEY_FIELD: &str = "key";

/// Interpret a JSON value as an identifier.
///
/// Non-empty strings are taken as-is and numbers are rendered in decimal.
/// `null`, empty strings, booleans, arrays, and objects are not identifiers.
pub fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The identifier carried in a document's `id` field, if any.
pub fn document_id(document: &Document) -> Option<String> {
    document.get(ID_FIELD).and_then(id_from_value)
}

/// Fill `id` from the storage key unless the document already carries a
/// usable identifier (see [`id_from_value`]).
pub fn ensure_id(document: &mut Document, key: &str) {
    if document_id(document).is_none() {
        document.insert(ID_FIELD.to_string(), Value::String(key.to_string()));
    }
}

/// Render a timestamp the way docbridge stores it inside documents.
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
