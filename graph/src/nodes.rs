use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;

use futures::StreamExt as _;
use futures::TryStreamExt as _;
use futures::stream;
use tracing::debug;
use tracing::warn;
use zog_zotero::Item;
use zog_zotero::ZoteroClient;
use zog_zotero::ZoteroError;

/// Requests kept in flight while fetching related items.
pub const MAX_IN_FLIGHT: usize = 8;

/// Placeholder for attributes an item does not carry (child notes have no title or URL).
const MISSING_FIELD: &str = "note";
/// Placeholder for every attribute of an item that could not be fetched.
const UNAVAILABLE: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub item_type: String,
    pub title: String,
    pub url: String,
}

impl NodeData {
    pub fn from_item(item: &Item) -> Self {
        let field = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| MISSING_FIELD.to_string())
        };
        Self {
            item_type: field(&item.data.item_type),
            title: field(&item.data.title),
            url: field(&item.data.url),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            item_type: UNAVAILABLE.to_string(),
            title: UNAVAILABLE.to_string(),
            url: UNAVAILABLE.to_string(),
        }
    }
}

/// Anything that can look up a single Zotero item by key.
pub trait ItemSource {
    fn item(&self, key: &str) -> impl Future<Output = Result<Item, ZoteroError>>;
}

impl ItemSource for ZoteroClient {
    fn item(&self, key: &str) -> impl Future<Output = Result<Item, ZoteroError>> {
        ZoteroClient::item(self, key)
    }
}

/// Attributes for every node.
///
/// Items in `known` are used as-is; the remaining keys are fetched from `source`. Keys that no
/// longer resolve (deleted items, items outside the library) get [`NodeData::unavailable`].
pub async fn collect_node_data<S: ItemSource>(
    source: &S,
    nodes: &BTreeSet<String>,
    known: &[Item],
) -> Result<BTreeMap<String, NodeData>, ZoteroError> {
    let known: HashMap<&str, &Item> = known
        .iter()
        .map(|item| (item.data.key.as_str(), item))
        .collect();

    let mut data = BTreeMap::new();
    let mut missing = Vec::new();
    for node in nodes {
        match known.get(node.as_str()) {
            Some(item) => {
                data.insert(node.clone(), NodeData::from_item(item));
            }
            None => missing.push(node.clone()),
        }
    }

    debug!(
        reused = data.len(),
        fetching = missing.len(),
        "collecting node attributes"
    );

    let fetched: Vec<(String, NodeData)> = stream::iter(missing)
        .map(|key| async move {
            match source.item(&key).await {
                Ok(item) => Ok((key, NodeData::from_item(&item))),
                Err(err) if err.is_not_found() => {
                    warn!(item = %key, "related item is unavailable; keeping node without attributes");
                    Ok((key, NodeData::unavailable()))
                }
                Err(err) => Err(err),
            }
        })
        .buffered(MAX_IN_FLIGHT)
        .try_collect()
        .await?;
    data.extend(fetched);

    Ok(data)
}
