use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing::warn;
use zog_graph::GraphmlOptions;
use zog_zotero::ZoteroClient;
use zog_zotero::ZoteroConfig;
use zog_zotero::collections::collection_key_from_path;

use crate::atomic_write::write_atomic;
use crate::path_utils::display_with_tilde;

/// Everything one export needs, after flags, env and config file are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub zotero: ZoteroConfig,
    pub collection_path: String,
    /// Absolute.
    pub output_path: PathBuf,
    pub graphml: GraphmlOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub nodes: usize,
    pub edges: usize,
}

pub async fn run(config: &RunConfig) -> anyhow::Result<RunSummary> {
    let client = ZoteroClient::new(&config.zotero).context("create Zotero client")?;
    info!(
        library = %client.library_url(),
        local = config.zotero.local,
        "reading Zotero library"
    );

    let collections = client.collections().await.context("list collections")?;
    let collection_key = collection_key_from_path(&collections, &config.collection_path)
        .with_context(|| format!("resolve collection path `{}`", config.collection_path))?;

    let items = client
        .collection_items(&collection_key)
        .await
        .with_context(|| format!("list items of collection {collection_key}"))?;
    if items.is_empty() {
        warn!(
            collection = %config.collection_path,
            "collection has no items; writing an empty graph"
        );
    }

    let relationships = zog_graph::create_relationships(&items);
    let nodes = zog_graph::extract_nodes(&relationships);
    info!(
        items = items.len(),
        relationships = relationships.len(),
        nodes = nodes.len(),
        "collected relationships"
    );

    let node_data = zog_graph::collect_node_data(&client, &nodes, &items)
        .await
        .context("fetch node attributes")?;
    let graph = zog_graph::build_graph(relationships, node_data);

    let written = write_atomic(&config.output_path, |out| {
        let stats = zog_graph::write_graphml(&graph, &mut *out, config.graphml)
            .context("render GraphML")?;
        out.write_all(b"\n")?;
        Ok(stats)
    })
    .with_context(|| format!("write {}", display_with_tilde(&config.output_path)))?;

    let summary = RunSummary {
        nodes: written.nodes,
        edges: written.edges,
    };
    info!(
        nodes = summary.nodes,
        edges = summary.edges,
        output = %display_with_tilde(&config.output_path),
        "wrote graph"
    );
    Ok(summary)
}
