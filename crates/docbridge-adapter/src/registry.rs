use std::collections::HashMap;

use docbridge_types::{normalize_resources, ResourceDescriptor, ResourceSpec, TypeError};

use crate::error::{AdapterError, AdapterResult};

/// Normalized resource descriptors, looked up by name. Built once; never
/// modified afterwards.
#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDescriptor>,
    by_name: HashMap<String, usize>,
}

impl ResourceRegistry {
    /// Normalize `specs`, failing on a nameless or duplicate resource.
    pub fn from_specs(specs: &[ResourceSpec]) -> Result<Self, TypeError> {
        let resources = normalize_resources(specs)?;
        let by_name = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();
        Ok(Self { resources, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.by_name.get(name).map(|&i| &self.resources[i])
    }

    pub fn resolve(&self, name: &str) -> AdapterResult<&ResourceDescriptor> {
        self.get(name)
            .ok_or_else(|| AdapterError::UnknownResource(name.to_string()))
    }

    /// Descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let registry = ResourceRegistry::from_specs(&[
            ResourceSpec::from("posts"),
            ResourceSpec::detailed("items", Some("/catalog/items/"), &["image"]),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["posts", "items"]);
        assert_eq!(registry.get("items").unwrap().storage_path, "catalog/items");
        assert!(registry.get("users").is_none());
        assert!(matches!(
            registry.resolve("users"),
            Err(AdapterError::UnknownResource(name)) if name == "users"
        ));
    }

    #[test]
    fn duplicates_rejected() {
        let err = ResourceRegistry::from_specs(&["posts".into(), "posts".into()]).unwrap_err();
        assert_eq!(err, TypeError::DuplicateResource("posts".into()));
    }

    #[test]
    fn nameless_rejected() {
        let err = ResourceRegistry::from_specs(&[ResourceSpec::detailed("", Some("x"), &[])]).unwrap_err();
        assert!(matches!(err, TypeError::MissingName(_)));
    }
}
