//! Neutral graph projection of a resolution result.
//!
//! The payload carries nodes with their scope and attribute bag, edges from
//! provider to requirer labeled with the requirement rule, and clusters
//! derived from scopes. Renderers consume it as JSON or DOT; image formats
//! stay outside the core.

use std::collections::HashMap;
use std::path::Path;

use petgraph::dot::Dot;
use petgraph::Graph;
use serde::Serialize;
use serde_json::{Map, Value};
use wireup_common::constants::{ROOT_RESOURCE, ROOT_SCOPE};
use wireup_common::error::{Result, WireupError};

use crate::catalog::Catalog;
use crate::resolver::EdgeMap;

/// A participating resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Resource name.
    pub name: String,
    /// Scope, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// The resource's opaque attribute bag.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

/// A resolved dependency edge, pointing from provider to requirer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    /// Providing resource.
    pub from: String,
    /// Requiring resource.
    pub to: String,
    /// Canonical requirement rule.
    pub rule: String,
    /// Effective instance used during matching.
    pub match_name: String,
}

/// A scope grouping of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphCluster {
    /// Cluster name (the scope).
    pub name: String,
    /// Member node names.
    pub members: Vec<String>,
}

/// Renderer-neutral adjacency description of a resolution result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphExport {
    /// Participating resources, in dependency order.
    pub nodes: Vec<GraphNode>,
    /// Resolved edges.
    pub edges: Vec<GraphEdge>,
    /// Scope groupings; empty when no resource carries a scope.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<GraphCluster>,
}

/// Projects an edge map and its dependency order into a [`GraphExport`].
///
/// Resources keep their dep-order position; the synthetic root gets a node
/// of its own so its edges stay visible.
#[must_use]
pub fn graph_export(catalog: &Catalog, edge_map: &EdgeMap, dep_order: &[String]) -> GraphExport {
    let mut nodes = Vec::with_capacity(dep_order.len());
    for name in dep_order {
        let node = if name == ROOT_RESOURCE {
            GraphNode {
                name: name.clone(),
                scope: Some(ROOT_SCOPE.to_string()),
                attrs: Map::new(),
            }
        } else {
            match catalog.get_resource(name) {
                Ok(resource) => GraphNode {
                    name: name.clone(),
                    scope: resource.scope().map(ToString::to_string),
                    attrs: resource.attrs().clone(),
                },
                // Strategy overrides may have introduced owners the catalog
                // does not know; keep the node bare.
                Err(_) => GraphNode {
                    name: name.clone(),
                    scope: None,
                    attrs: Map::new(),
                },
            }
        };
        nodes.push(node);
    }

    let mut edges = Vec::new();
    for name in dep_order {
        for edge in edge_map.get(name).unwrap_or_default() {
            edges.push(GraphEdge {
                from: edge.provider.owner.clone(),
                to: name.clone(),
                rule: edge.rule(),
                match_name: edge.match_name.clone(),
            });
        }
    }

    let mut clusters: Vec<GraphCluster> = Vec::new();
    for node in &nodes {
        if let Some(scope) = &node.scope {
            match clusters.iter_mut().find(|c| &c.name == scope) {
                Some(cluster) => cluster.members.push(node.name.clone()),
                None => clusters.push(GraphCluster {
                    name: scope.clone(),
                    members: vec![node.name.clone()],
                }),
            }
        }
    }

    GraphExport {
        nodes,
        edges,
        clusters,
    }
}

impl GraphExport {
    /// Serializes the payload as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if JSON encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the payload in DOT format with per-edge rule labels.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut graph: Graph<String, String> = Graph::new();
        let mut indices = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let _ = indices.insert(node.name.as_str(), graph.add_node(node.name.clone()));
        }
        for edge in &self.edges {
            if let (Some(&from), Some(&to)) =
                (indices.get(edge.from.as_str()), indices.get(edge.to.as_str()))
            {
                let _ = graph.add_edge(from, to, format!("{} ({})", edge.rule, edge.match_name));
            }
        }
        format!("{}", Dot::new(&graph))
    }

    /// Writes the JSON payload to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| WireupError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "graph JSON written");
        Ok(())
    }

    /// Writes the DOT rendering to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write_dot(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_dot()).map_err(|e| WireupError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "graph DOT written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::resolver::Resolver;
    use crate::resource::ResourceConfig;
    use serde_json::json;

    fn resolved_export() -> GraphExport {
        let mut catalog = Catalog::new();
        catalog
            .add_resource(
                "db",
                Some("infra"),
                ResourceConfig::new()
                    .provides("database.main")
                    .attr("team", "storage"),
                false,
            )
            .expect("db");
        catalog
            .add_resource(
                "app",
                Some("apps"),
                ResourceConfig::new()
                    .requires("database.main")
                    .provides("app.web"),
                false,
            )
            .expect("app");

        let mut resolver = Resolver::new(&catalog, ["app.web"]);
        let _ = resolver.resolve().expect("should resolve");
        resolver.export()
    }

    #[test]
    fn nodes_follow_dep_order_and_carry_attrs() {
        let export = resolved_export();
        let names: Vec<&str> = export.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["db", "app", ROOT_RESOURCE]);
        assert_eq!(export.nodes[0].attrs.get("team"), Some(&json!("storage")));
        assert_eq!(export.nodes[2].scope.as_deref(), Some(ROOT_SCOPE));
    }

    #[test]
    fn edges_point_from_provider_to_requirer() {
        let export = resolved_export();
        assert_eq!(export.edges.len(), 2);

        let app_edge = export
            .edges
            .iter()
            .find(|e| e.to == "app")
            .expect("edge into app");
        assert_eq!(app_edge.from, "db");
        assert_eq!(app_edge.rule, "database.main");
        assert_eq!(app_edge.match_name, "main");
    }

    #[test]
    fn clusters_group_by_scope() {
        let export = resolved_export();
        let names: Vec<&str> = export.clusters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["infra", "apps", ROOT_SCOPE]);
        assert_eq!(export.clusters[0].members, vec!["db"]);
    }

    #[test]
    fn json_payload_is_well_formed() {
        let export = resolved_export();
        let json = export.to_json().expect("should serialize");
        let value: Value = serde_json::from_str(&json).expect("should parse back");
        assert_eq!(value["nodes"][0]["name"], "db");
        assert_eq!(value["edges"][0]["from"], "db");
    }

    #[test]
    fn dot_rendering_labels_edges() {
        let export = resolved_export();
        let dot = export.to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("db"));
        assert!(dot.contains("database.main (main)"));
    }

    #[test]
    fn files_are_written() {
        let export = resolved_export();
        let dir = tempfile::tempdir().expect("tempdir");

        let json_path = dir.path().join("graph.json");
        export.write_json(&json_path).expect("json write");
        assert!(json_path.exists());

        let dot_path = dir.path().join("graph.dot");
        export.write_dot(&dot_path).expect("dot write");
        let content = std::fs::read_to_string(&dot_path).expect("read back");
        assert!(content.contains("digraph"));
    }
}
