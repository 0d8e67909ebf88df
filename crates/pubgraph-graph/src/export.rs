//! Node/link graph document consumed by the visualisation.
//!
//! ```json
//! {"nodes": [{"PMID": "1", "abstract": "...", "title": "..."}, {"PMID": "2"}],
//!  "links": [{"source": 0, "target": 1, "value": 1.0}]}
//! ```
//!
//! The query node is always `nodes[0]`. Neighbor nodes carry only their PMID.

use serde::Serialize;

use crate::citation::Citation;

/// Index of the query node in `nodes`.
pub const QUERY_NODE: usize = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Query(QueryNode),
    Neighbor(NeighborNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryNode {
    #[serde(rename = "PMID")]
    pub pmid: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborNode {
    #[serde(rename = "PMID")]
    pub pmid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

impl CitationGraph {
    /// Assemble the graph from a root and its (already normalised) neighbors.
    pub fn build(root: &Citation, neighbors: &[Citation]) -> Self {
        let mut nodes = Vec::with_capacity(neighbors.len() + 1);
        nodes.push(Node::Query(QueryNode {
            pmid: root.pmid().map(str::to_string),
            abstract_text: root.abstract_text().map(str::to_string),
            title: root.title().map(str::to_string),
        }));
        nodes.extend(neighbors.iter().map(|n| {
            Node::Neighbor(NeighborNode { pmid: n.pmid().map(str::to_string) })
        }));

        let links = neighbors
            .iter()
            .enumerate()
            .map(|(i, n)| Link {
                source: QUERY_NODE,
                target: i + 1,
                value: n.normalized_score(),
            })
            .collect();

        Self { nodes, links }
    }

    pub fn neighbor_count(&self) -> usize {
        self.links.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
