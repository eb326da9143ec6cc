use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::nodes::NodeData;
use crate::relations::Relationship;

/// Directed graph of Zotero items.
///
/// Nodes are ordered by key. Parallel edges collapse into one and keep the position of their
/// first insertion; self-loops are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiGraph {
    nodes: BTreeMap<String, Option<NodeData>>,
    edges: Vec<Relationship>,
    edge_set: HashSet<Relationship>,
}

impl DiGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key`, or replaces its attributes if it already exists.
    pub fn add_node(&mut self, key: impl Into<String>, data: NodeData) {
        self.nodes.insert(key.into(), Some(data));
    }

    pub fn add_nodes_from(&mut self, nodes: impl IntoIterator<Item = (String, NodeData)>) {
        for (key, data) in nodes {
            self.add_node(key, data);
        }
    }

    /// Adds a directed edge. Endpoints that are not in the graph yet are added without
    /// attributes.
    pub fn add_edge(&mut self, source: impl Into<String>, target: impl Into<String>) {
        let edge = (source.into(), target.into());
        self.nodes.entry(edge.0.clone()).or_default();
        self.nodes.entry(edge.1.clone()).or_default();
        if self.edge_set.insert(edge.clone()) {
            self.edges.push(edge);
        }
    }

    pub fn add_edges_from(&mut self, edges: impl IntoIterator<Item = Relationship>) {
        for (source, target) in edges {
            self.add_edge(source, target);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, Option<&NodeData>)> {
        self.nodes
            .iter()
            .map(|(key, data)| (key.as_str(), data.as_ref()))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .map(|(source, target)| (source.as_str(), target.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data(title: &str) -> NodeData {
        NodeData {
            item_type: "book".to_string(),
            title: title.to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut graph = DiGraph::new();
        graph.add_edges_from([
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "A".to_string()),
            ("A".to_string(), "B".to_string()),
        ]);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![("A", "B"), ("B", "A")]);
    }

    #[test]
    fn edges_keep_node_attributes() {
        let mut graph = DiGraph::new();
        graph.add_node("A", data("First"));
        graph.add_edge("A", "A");
        graph.add_edge("A", "C");

        let nodes: Vec<_> = graph.nodes().collect();
        assert_eq!(nodes, vec![("A", Some(&data("First"))), ("C", None)]);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![("A", "A"), ("A", "C")]);
    }

    #[test]
    fn re_adding_a_node_replaces_attributes() {
        let mut graph = DiGraph::new();
        graph.add_nodes_from([
            ("A".to_string(), data("Old")),
            ("A".to_string(), data("New")),
        ]);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes().next(), Some(("A", Some(&data("New")))));
    }
}
