//! Resolve human-readable collection paths (`Projects/PRIME/Datasets`) to collection keys.

use tracing::warn;

use crate::error::ResolveError;
use crate::models::Collection;

/// Key of the first collection named `name`, anywhere in the library.
pub fn named_collection_key<'a>(
    collections: &'a [Collection],
    name: &str,
) -> Result<&'a str, ResolveError> {
    collections
        .iter()
        .find(|collection| collection.data.name == name)
        .map(|collection| collection.key.as_str())
        .ok_or_else(|| ResolveError::CollectionNotFound(name.to_string()))
}

/// Resolve a `/`-separated collection path to the key of its last component.
///
/// The first component may name a collection at any depth (top-level collections win ties).
/// Every later component is looked up among the children of the previous one; when no child
/// matches, the lookup falls back to the whole library.
pub fn collection_key_from_path(
    collections: &[Collection],
    collection_path: &str,
) -> Result<String, ResolveError> {
    let mut current: Option<&str> = None;

    for name in collection_path.split('/').filter(|part| !part.is_empty()) {
        let key = match current {
            None => root_collection_key(collections, name)?,
            Some(parent) => match child_collection_key(collections, parent, name) {
                Some(key) => key,
                None => {
                    let key = named_collection_key(collections, name)?;
                    warn!(
                        collection = name,
                        parent_key = parent,
                        "collection is not a child of the previous path component; using library-wide match"
                    );
                    key
                }
            },
        };
        current = Some(key);
    }

    current
        .map(str::to_string)
        .ok_or(ResolveError::EmptyCollectionPath)
}

fn root_collection_key<'a>(
    collections: &'a [Collection],
    name: &str,
) -> Result<&'a str, ResolveError> {
    collections
        .iter()
        .find(|collection| {
            collection.data.name == name && collection.data.parent_collection.is_none()
        })
        .map(|collection| collection.key.as_str())
        .map_or_else(|| named_collection_key(collections, name), Ok)
}

fn child_collection_key<'a>(
    collections: &'a [Collection],
    parent: &str,
    name: &str,
) -> Option<&'a str> {
    collections
        .iter()
        .find(|collection| {
            collection.data.name == name
                && collection.data.parent_collection.as_deref() == Some(parent)
        })
        .map(|collection| collection.key.as_str())
}
