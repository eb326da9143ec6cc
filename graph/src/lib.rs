//! Turn Zotero "related item" links into a directed graph and serialize it as GraphML.

mod graph;
mod graphml;
mod nodes;
mod relations;

use std::collections::BTreeMap;

pub use graph::DiGraph;
pub use graphml::GraphmlOptions;
pub use graphml::GraphmlStats;
pub use graphml::to_graphml_string;
pub use graphml::write_graphml;
pub use nodes::ItemSource;
pub use nodes::MAX_IN_FLIGHT;
pub use nodes::NodeData;
pub use nodes::collect_node_data;
pub use relations::Relationship;
pub use relations::create_relationships;
pub use relations::extract_nodes;
pub use relations::last_path_segment;

/// Nodes first, then edges, so every edge endpoint carries its attributes.
pub fn build_graph(
    relationships: Vec<Relationship>,
    node_data: BTreeMap<String, NodeData>,
) -> DiGraph {
    let mut graph = DiGraph::new();
    graph.add_nodes_from(node_data);
    graph.add_edges_from(relationships);
    graph
}
