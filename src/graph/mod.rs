//! Graph export: translates the persisted relationships into a directed
//! property graph.
//!
//! Node identity in the output is structural (namespace + name), not the
//! relational surrogate key, so relationships sharing an endpoint resolve
//! to the same node while parallel relationships keep one edge each.

use crate::db::Db;
use crate::error::Result;
use crate::store;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Namespace tag for microRNA nodes (mirBase identifiers)
pub const MIRNA_NAMESPACE: &str = "MIRBASE";

/// Namespace tag for disease nodes (MeSH terms)
pub const DISEASE_NAMESPACE: &str = "MESH";

/// Relation label carried by every exported edge
pub const ASSOCIATION: &str = "association";

/// PubMed identifier of the miR2Disease publication, cited on every edge
pub const CITATION: &str = "18927107";

/// A namespaced node of the association graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssociationNode {
    pub namespace: &'static str,
    pub name: String,
}

impl fmt::Display for AssociationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Attributes of one exported relationship edge
#[derive(Debug, Clone, Serialize)]
pub struct AssociationEdge {
    pub relation: &'static str,
    pub evidence: String,
    pub citation: &'static str,
}

impl fmt::Display for AssociationEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relation)
    }
}

/// Directed multigraph of miRNA-disease associations
pub type AssociationGraph = DiGraph<AssociationNode, AssociationEdge>;

/// Build the association graph from the persisted relationships.
///
/// One edge per relationship, miRNA source to disease target, evidence
/// verbatim. Pure read of the store: exporting twice without intervening
/// writes yields an isomorphic graph.
pub async fn export(db: &Db) -> Result<AssociationGraph> {
    let relationships = store::list_relationships(db).await?;

    let mut graph = AssociationGraph::new();
    let mut nodes: HashMap<AssociationNode, NodeIndex> = HashMap::new();

    for relationship in relationships {
        let source = intern(
            &mut graph,
            &mut nodes,
            AssociationNode {
                namespace: MIRNA_NAMESPACE,
                name: relationship.mirna.name,
            },
        );
        let target = intern(
            &mut graph,
            &mut nodes,
            AssociationNode {
                namespace: DISEASE_NAMESPACE,
                name: relationship.disease.name,
            },
        );
        graph.add_edge(
            source,
            target,
            AssociationEdge {
                relation: ASSOCIATION,
                evidence: relationship.description,
                citation: CITATION,
            },
        );
    }

    log::info!(
        "exported graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn intern(
    graph: &mut AssociationGraph,
    nodes: &mut HashMap<AssociationNode, NodeIndex>,
    node: AssociationNode,
) -> NodeIndex {
    if let Some(&index) = nodes.get(&node) {
        return index;
    }
    let index = graph.add_node(node.clone());
    nodes.insert(node, index);
    index
}

/// Render the graph in GraphViz DOT form
pub fn to_dot(graph: &AssociationGraph) -> String {
    format!("{}", petgraph::dot::Dot::new(graph))
}

/// Serialize the graph as a `{nodes, edges}` JSON document, edges
/// referencing nodes by array position
pub fn to_json(graph: &AssociationGraph) -> serde_json::Value {
    let nodes: Vec<&AssociationNode> = graph.node_indices().map(|i| &graph[i]).collect();
    let edges: Vec<serde_json::Value> = graph
        .edge_references()
        .map(|edge| {
            serde_json::json!({
                "source": edge.source().index(),
                "target": edge.target().index(),
                "relation": edge.weight().relation,
                "evidence": edge.weight().evidence,
                "citation": edge.weight().citation,
            })
        })
        .collect();

    serde_json::json!({
        "directed": true,
        "nodes": nodes,
        "edges": edges,
    })
}
