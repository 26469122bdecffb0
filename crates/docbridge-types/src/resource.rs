use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A resource as declared in configuration: either a bare name or a table
/// with an optional storage path and upload fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceSpec {
    Name(String),
    Detailed {
        #[serde(default)]
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        upload_fields: Vec<String>,
    },
}

impl ResourceSpec {
    pub fn detailed(
        name: impl Into<String>,
        path: Option<&str>,
        upload_fields: &[&str],
    ) -> Self {
        Self::Detailed {
            name: name.into(),
            path: path.map(str::to_string),
            upload_fields: upload_fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Normalize into a descriptor. The storage path defaults to the name.
    pub fn normalize(&self) -> Result<ResourceDescriptor, TypeError> {
        let (name, path, upload_fields) = match self {
            Self::Name(name) => (name, None, Vec::new()),
            Self::Detailed {
                name,
                path,
                upload_fields,
            } => (name, path.as_deref(), upload_fields.clone()),
        };
        if name.trim().is_empty() {
            return Err(TypeError::MissingName(format!("{self:?}")));
        }
        let storage_path = match path {
            Some(p) if !p.trim().is_empty() => p.trim_matches('/').to_string(),
            _ => name.clone(),
        };
        Ok(ResourceDescriptor {
            name: name.clone(),
            storage_path,
            upload_fields,
        })
    }
}

impl From<&str> for ResourceSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Normalized, immutable per-resource configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    pub storage_path: String,
    pub upload_fields: Vec<String>,
}

impl ResourceDescriptor {
    /// Path of a single document: `storage_path/id`.
    pub fn document_path(&self, id: &str) -> String {
        format!("{}/{}", self.storage_path, id)
    }

    /// Blob path for an upload field: `storage_path/id/field`.
    pub fn blob_path(&self, id: &str, field: &str) -> String {
        format!("{}/{}/{}", self.storage_path, id, field)
    }

    pub fn has_upload_fields(&self) -> bool {
        !self.upload_fields.is_empty()
    }
}

/// Normalize a declarative resource list, rejecting nameless and duplicate
/// entries. Declaration order is preserved.
pub fn normalize_resources(specs: &[ResourceSpec]) -> Result<Vec<ResourceDescriptor>, TypeError> {
    let mut seen = HashSet::new();
    let mut descriptors = Vec::with_capacity(specs.len());
    for spec in specs {
        let descriptor = spec.normalize()?;
        if !seen.insert(descriptor.name.clone()) {
            return Err(TypeError::DuplicateResource(descriptor.name));
        }
        descriptors.push(descriptor);
    }
    Ok(descriptors)
}

/// Names of the managed timestamp fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampFieldNames {
    pub created_at: String,
    pub updated_at: String,
}

impl Default for TimestampFieldNames {
    fn default() -> Self {
        Self {
            created_at: "createdAt".into(),
            updated_at: "updatedAt".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_name_defaults() {
        let d = ResourceSpec::from("posts").normalize().unwrap();
        assert_eq!(d.name, "posts");
        assert_eq!(d.storage_path, "posts");
        assert!(d.upload_fields.is_empty());
    }

    #[test]
    fn detailed_with_path_and_fields() {
        let d = ResourceSpec::detailed("items", Some("catalog/items/"), &["image", "manual"])
            .normalize()
            .unwrap();
        assert_eq!(d.storage_path, "catalog/items");
        assert_eq!(d.upload_fields, vec!["image", "manual"]);
        assert_eq!(d.document_path("a1"), "catalog/items/a1");
        assert_eq!(d.blob_path("a1", "image"), "catalog/items/a1/image");
    }

    #[test]
    fn empty_path_falls_back_to_name() {
        let d = ResourceSpec::detailed("tags", Some(""), &[]).normalize().unwrap();
        assert_eq!(d.storage_path, "tags");
    }

    #[test]
    fn missing_name_fails() {
        let spec: ResourceSpec = serde_json::from_value(json!({"path": "orphans"})).unwrap();
        assert!(matches!(spec.normalize(), Err(TypeError::MissingName(_))));
        assert!(matches!(ResourceSpec::from("  ").normalize(), Err(TypeError::MissingName(_))));
    }

    #[test]
    fn duplicates_rejected() {
        let specs = vec![ResourceSpec::from("a"), ResourceSpec::from("b"), ResourceSpec::from("a")];
        assert_eq!(
            normalize_resources(&specs),
            Err(TypeError::DuplicateResource("a".into()))
        );
    }

    #[test]
    fn mixed_list_deserializes() {
        let specs: Vec<ResourceSpec> = serde_json::from_value(json!([
            "posts",
            {"name": "items", "upload_fields": ["image"]}
        ]))
        .unwrap();
        let descriptors = normalize_resources(&specs).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].storage_path, "items");
        assert!(descriptors[1].has_upload_fields());
    }

    #[test]
    fn timestamp_defaults() {
        let names = TimestampFieldNames::default();
        assert_eq!(names.created_at, "createdAt");
        assert_eq!(names.updated_at, "updatedAt");
        let partial: TimestampFieldNames =
            serde_json::from_value(json!({"created_at": "created"})).unwrap();
        assert_eq!(partial.created_at, "created");
        assert_eq!(partial.updated_at, "updatedAt");
    }
}
