use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{timestamp_value, Document};
use crate::error::TypeError;

/// Member of a submitted upload entry that carries the file itself.
pub const RAW_FILE_FIELD: &str = "rawFile";

/// Stored-file metadata that replaces an upload field's value in a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    pub src: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl UploadDescriptor {
    pub fn new(src: impl Into<String>, mime_type: impl Into<String>, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            src: src.into(),
            uploaded_at,
            mime_type: mime_type.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// The value stored under the field name: a one-element array.
    pub fn to_field_value(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("src".into(), Value::String(self.src.clone()));
        entry.insert("uploadedAt".into(), timestamp_value(self.uploaded_at));
        entry.insert("type".into(), Value::String(self.mime_type.clone()));
        if let Some(width) = self.width {
            entry.insert("width".into(), Value::from(width));
        }
        if let Some(height) = self.height {
            entry.insert("height".into(), Value::from(height));
        }
        Value::Array(vec![Value::Object(entry)])
    }
}

/// A file submitted inside record data, base64-encoded on the wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `data:` URL embedding the file contents.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    /// The upload entry wrapping this file, as submitted by a client.
    pub fn to_entry(&self) -> Value {
        let mut file = Map::new();
        file.insert("name".into(), Value::String(self.name.clone()));
        file.insert("type".into(), Value::String(self.mime_type.clone()));
        file.insert("data".into(), Value::String(STANDARD.encode(&self.data)));
        let mut entry = Map::new();
        entry.insert(RAW_FILE_FIELD.into(), Value::Object(file));
        Value::Object(entry)
    }

    /// Parse the `rawFile` member of an upload entry, if the entry has one.
    pub fn from_entry(field: &str, entry: &Value) -> Result<Option<Self>, TypeError> {
        match entry.get(RAW_FILE_FIELD) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => serde_json::from_value(raw.clone())
                .map(Some)
                .map_err(|e| TypeError::InvalidFile {
                    field: field.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl fmt::Debug for RawFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// The file submitted for `field`, taken from the first entry of its array.
///
/// Returns `Ok(None)` when the field is absent, empty, holds no `rawFile`,
/// or the file has no name. A `rawFile` that cannot be decoded is an error.
pub fn raw_file_in(data: &Document, field: &str) -> Result<Option<RawFile>, TypeError> {
    let Some(first) = data.get(field).and_then(Value::as_array).and_then(|a| a.first()) else {
        return Ok(None);
    };
    let file = RawFile::from_entry(field, first)?;
    Ok(file.filter(|f| !f.name.is_empty()))
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(de::Error::custom)
    }
}
