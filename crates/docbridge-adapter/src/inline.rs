use docbridge_types::{Document, RawFile, Request, TypeError};
use serde_json::{Map, Value};
use tracing::debug;

/// Field whose value names an inlined picture.
const TITLE_FIELD: &str = "title";

/// Request decorator that embeds submitted files as data URLs instead of
/// sending them to blob storage.
///
/// Applies to `update` only. For each configured field, entries carrying a
/// raw file become `{src: "data:<mime>;base64,...", title}` where `title` is
/// the record's title; they are placed first, followed by the entries that
/// were already there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineUploads {
    fields: Vec<String>,
}

impl Default for InlineUploads {
    fn default() -> Self {
        Self::new(["image"])
    }
}

impl InlineUploads {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn apply(&self, request: Request) -> Result<Request, TypeError> {
        match request {
            Request::Update(mut params) => {
                for field in &self.fields {
                    inline_field(&mut params.data, field)?;
                }
                Ok(Request::Update(params))
            }
            other => Ok(other),
        }
    }
}

fn inline_field(data: &mut Document, field: &str) -> Result<(), TypeError> {
    let entries = match data.get(field) {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Ok(()),
    };
    let title = title_of(data);
    let mut inlined = Vec::new();
    let mut former = Vec::new();
    for entry in entries {
        match RawFile::from_entry(field, entry)? {
            Some(file) => {
                let mut picture = Map::new();
                picture.insert("src".into(), Value::String(file.to_data_url()));
                picture.insert(TITLE_FIELD.into(), Value::String(title.clone()));
                inlined.push(Value::Object(picture));
            }
            None => former.push(entry.clone()),
        }
    }
    if inlined.is_empty() {
        return Ok(());
    }
    debug!(field, inlined = inlined.len(), kept = former.len(), "inlined uploads");
    inlined.extend(former);
    data.insert(field.to_string(), Value::Array(inlined));
    Ok(())
}

fn title_of(data: &Document) -> String {
    match data.get(TITLE_FIELD) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
