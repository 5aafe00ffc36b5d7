//! Key namespace for one entity type.
//!
//! `<ns>:<id>` for single entities, `<ns>:list:<page>:<size>` for list
//! pages. Both families are reachable by a single glob delete.

/// Builds keys and invalidation patterns for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl KeySpace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn entity_key(&self, id: &str) -> String {
        format!("{}:{}", self.namespace, id)
    }

    pub fn list_key(&self, page: u32, page_size: u32) -> String {
        format!("{}:list:{}:{}", self.namespace, page, page_size)
    }

    /// Matches every key in the namespace, list pages included.
    pub fn entity_pattern(&self) -> String {
        format!("{}:*", self.namespace)
    }

    /// Matches every list page of every page size.
    pub fn list_pattern(&self) -> String {
        format!("{}:list:*", self.namespace)
    }
}
