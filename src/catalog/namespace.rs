use crate::repository::interface::NamespaceRow;

use super::{CatalogError, CatalogResult, DEFAULT_SCHEMA};

/// Find the namespace called `requested` (or [`DEFAULT_SCHEMA`] when empty).
/// Names are compared exactly.
pub fn resolve_namespace(
    namespaces: &[NamespaceRow],
    requested: &str,
) -> CatalogResult<NamespaceRow> {
    let name = if requested.is_empty() {
        DEFAULT_SCHEMA
    } else {
        requested
    };

    namespaces
        .iter()
        .find(|ns| ns.name == name)
        .cloned()
        .ok_or_else(|| CatalogError::NamespaceNotFound {
            name: name.to_string(),
        })
}
