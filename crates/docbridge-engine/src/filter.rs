use docbridge_types::{Document, ResourceDescriptor};

/// Transformation applied to every document right before it is written.
///
/// Hook for redaction or reshaping. Any
/// `Fn(&ResourceDescriptor, Document) -> Document` closure is a filter.
pub trait SaveFilter: Send + Sync {
    fn filter(&self, resource: &ResourceDescriptor, document: Document) -> Document;
}

/// Writes documents unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityFilter;

impl SaveFilter for IdentityFilter {
    fn filter(&self, _resource: &ResourceDescriptor, document: Document) -> Document {
        document
    }
}

impl<F> SaveFilter for F
where
    F: Fn(&ResourceDescriptor, Document) -> Document + Send + Sync,
{
    fn filter(&self, resource: &ResourceDescriptor, document: Document) -> Document {
        self(resource, document)
    }
}
