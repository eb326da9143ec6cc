//! GraphML serialization.
//!
//! Output follows the layout most GraphML consumers (Gephi, yEd, networkx) expect: attribute
//! `<key>` declarations first, then a single directed `<graph>` with nodes before edges.

use std::io::Write;

use anyhow::Context;
use quick_xml::Writer;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;

use crate::graph::DiGraph;
use crate::nodes::NodeData;

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd";

/// Node attribute keys, in declaration order.
const NODE_KEYS: [(&str, &str); 3] = [("d0", "item_type"), ("d1", "title"), ("d2", "url")];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphmlOptions {
    /// Omit `A -> A` edges. The node itself is still written.
    pub drop_self_loops: bool,
}

/// What actually ended up in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphmlStats {
    pub nodes: usize,
    pub edges: usize,
}

pub fn write_graphml<W: Write>(
    graph: &DiGraph,
    inner: W,
    options: GraphmlOptions,
) -> anyhow::Result<GraphmlStats> {
    let mut stats = GraphmlStats::default();
    let mut writer = Writer::new_with_indent(inner, b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .context("write XML declaration")?;
    writer
        .write_event(Event::Start(BytesStart::new("graphml").with_attributes([
            ("xmlns", GRAPHML_NS),
            ("xmlns:xsi", XSI_NS),
            ("xsi:schemaLocation", SCHEMA_LOCATION),
        ])))
        .context("open <graphml>")?;

    for (id, name) in NODE_KEYS {
        writer
            .write_event(Event::Empty(BytesStart::new("key").with_attributes([
                ("id", id),
                ("for", "node"),
                ("attr.name", name),
                ("attr.type", "string"),
            ])))
            .with_context(|| format!("write <key> {name}"))?;
    }

    writer
        .write_event(Event::Start(
            BytesStart::new("graph").with_attributes([("edgedefault", "directed")]),
        ))
        .context("open <graph>")?;

    for (key, data) in graph.nodes() {
        write_node(&mut writer, key, data).with_context(|| format!("write node {key}"))?;
        stats.nodes += 1;
    }

    for (source, target) in graph.edges() {
        if options.drop_self_loops && source == target {
            continue;
        }
        writer
            .write_event(Event::Empty(
                BytesStart::new("edge").with_attributes([("source", source), ("target", target)]),
            ))
            .with_context(|| format!("write edge {source} -> {target}"))?;
        stats.edges += 1;
    }

    writer
        .write_event(Event::End(BytesEnd::new("graph")))
        .context("close <graph>")?;
    writer
        .write_event(Event::End(BytesEnd::new("graphml")))
        .context("close <graphml>")?;

    Ok(stats)
}

/// Convenience wrapper returning the document as a string.
pub fn to_graphml_string(graph: &DiGraph, options: GraphmlOptions) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    write_graphml(graph, &mut buf, options)?;
    String::from_utf8(buf).context("GraphML output is not UTF-8")
}

fn write_node<W: Write>(
    writer: &mut Writer<W>,
    key: &str,
    data: Option<&NodeData>,
) -> anyhow::Result<()> {
    let node = BytesStart::new("node").with_attributes([("id", key)]);
    let Some(data) = data else {
        writer.write_event(Event::Empty(node))?;
        return Ok(());
    };

    writer.write_event(Event::Start(node))?;
    let values = [&data.item_type, &data.title, &data.url];
    for ((id, _), value) in NODE_KEYS.into_iter().zip(values) {
        writer.write_event(Event::Start(
            BytesStart::new("data").with_attributes([("key", id)]),
        ))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new("data")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("node")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_graph() -> DiGraph {
        let mut graph = DiGraph::new();
        graph.add_node(
            "AAAA0001",
            NodeData {
                item_type: "journalArticle".to_string(),
                title: "Graphs & <Trees>".to_string(),
                url: "https://example.org/a?x=1&y=2".to_string(),
            },
        );
        graph.add_node(
            "BBBB0002",
            NodeData {
                item_type: "note".to_string(),
                title: "note".to_string(),
                url: "note".to_string(),
            },
        );
        graph.add_edge("AAAA0001", "BBBB0002");
        graph.add_edge("BBBB0002", "BBBB0002");
        graph
    }

    #[test]
    fn renders_nodes_keys_and_edges() {
        let xml = to_graphml_string(&sample_graph(), GraphmlOptions::default()).expect("graphml");
        insta::assert_snapshot!(xml);
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        let xml = to_graphml_string(&sample_graph(), GraphmlOptions::default()).expect("graphml");
        assert!(xml.contains("<data key=\"d1\">Graphs &amp; &lt;Trees&gt;</data>"));
        assert!(xml.contains("<data key=\"d2\">https://example.org/a?x=1&amp;y=2</data>"));
    }

    #[test]
    fn drop_self_loops_keeps_the_node() {
        let xml = to_graphml_string(
            &sample_graph(),
            GraphmlOptions {
                drop_self_loops: true,
            },
        )
        .expect("graphml");

        assert!(xml.contains("<node id=\"BBBB0002\">"));
        assert!(!xml.contains("<edge source=\"BBBB0002\" target=\"BBBB0002\"/>"));
        assert_eq!(xml.matches("<edge ").count(), 1);
    }

    #[test]
    fn stats_count_only_written_edges() {
        let graph = sample_graph();
        let mut buf = Vec::new();

        let all = write_graphml(&graph, &mut buf, GraphmlOptions::default()).expect("graphml");
        assert_eq!(all, GraphmlStats { nodes: 2, edges: 2 });

        buf.clear();
        let without_loops = write_graphml(
            &graph,
            &mut buf,
            GraphmlOptions {
                drop_self_loops: true,
            },
        )
        .expect("graphml");
        assert_eq!(without_loops, GraphmlStats { nodes: 2, edges: 1 });
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn node_without_attributes_is_empty_element() {
        let mut graph = DiGraph::new();
        graph.add_edge("CCCC0003", "CCCC0003");

        let xml = to_graphml_string(&graph, GraphmlOptions::default()).expect("graphml");
        assert!(xml.contains("<node id=\"CCCC0003\"/>"));
    }
}
