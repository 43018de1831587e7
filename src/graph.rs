use crate::config::Config;
use crate::model::{CodeEntity, D3Graph, D3Link, D3Node};
use crate::util;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const ARTIFACT_FILE: &str = "graph.json";

/// The assembled dependency graph for one project scan.
///
/// `nodes` is the project-wide declaration registry keyed by fqn, `file_nodes`
/// lists each file's top-level declarations in source order, and
/// `file_import_nodes` holds the resolved import edges per file: the fqns a
/// file's imports make reachable *and* that its body actually references.
/// Ordered maps keep the serialized artifact byte-stable across runs.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: BTreeMap<String, CodeEntity>,
    #[serde(rename = "fileNodes")]
    pub file_nodes: BTreeMap<String, Vec<String>>,
    #[serde(rename = "fileImportNode")]
    pub file_import_nodes: BTreeMap<String, BTreeSet<String>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of several graphs by shallow key overwrite; later graphs win on
    /// collision. Sub-graphs built per language carry disjoint fqn namespaces,
    /// so in practice nothing is lost.
    pub fn merge(graphs: Vec<Graph>) -> Graph {
        let mut merged = Graph::new();
        for graph in graphs {
            merged.nodes.extend(graph.nodes);
            merged.file_nodes.extend(graph.file_nodes);
            merged.file_import_nodes.extend(graph.file_import_nodes);
        }
        merged
    }

    pub fn declaration_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.file_import_nodes.values().map(|set| set.len()).sum()
    }

    /// Default artifact location under a scanned root.
    pub fn artifact_path(root: &Path) -> PathBuf {
        root.join(&Config::get().artifact_dir).join(ARTIFACT_FILE)
    }

    /// Serialize and persist the graph, fully overwriting any previous
    /// artifact at the same path.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        util::ensure_parent_dir(path)?;
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Graph> {
        let text = util::read_to_string(path)?;
        let graph = serde_json::from_str(&text)
            .with_context(|| format!("parse graph artifact {}", path.display()))?;
        Ok(graph)
    }

    /// Derive the visualization view: every file and every declaration becomes
    /// a node, links go from a file to each fqn it imports.
    pub fn to_d3(&self) -> D3Graph {
        let mut d3 = D3Graph::default();
        for path in self.file_nodes.keys() {
            d3.nodes.push(D3Node {
                id: path.clone(),
                group: "file".to_string(),
            });
        }
        for fqn in self.nodes.keys() {
            d3.nodes.push(D3Node {
                id: fqn.clone(),
                group: "code entity".to_string(),
            });
        }
        for (path, imports) in &self.file_import_nodes {
            for fqn in imports {
                d3.links.push(D3Link {
                    source: path.clone(),
                    target: fqn.clone(),
                });
            }
        }
        d3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, EntityLocation};

    fn entity(fqn: &str, path: &str) -> CodeEntity {
        CodeEntity {
            fqn: fqn.to_string(),
            kind: EntityKind::Function,
            content: EntityLocation {
                relative_path: path.to_string(),
                start_line: 1,
                end_line: 2,
            },
            uses: Vec::new(),
            used_by: Vec::new(),
        }
    }

    #[test]
    fn merge_later_wins() {
        let mut g1 = Graph::new();
        g1.nodes.insert("a.f".into(), entity("a.f", "a.py"));
        let mut g2 = Graph::new();
        let mut moved = entity("a.f", "b.py");
        moved.kind = EntityKind::Class;
        g2.nodes.insert("a.f".into(), moved);

        let merged = Graph::merge(vec![g1, g2]);
        assert_eq!(merged.nodes["a.f"].kind, EntityKind::Class);
        assert_eq!(merged.nodes["a.f"].content.relative_path, "b.py");
    }

    #[test]
    fn serialized_shape_has_three_keys() {
        let mut graph = Graph::new();
        graph.nodes.insert("m.f".into(), entity("m.f", "m.py"));
        graph.file_nodes.insert("m.py".into(), vec!["m.f".into()]);
        graph
            .file_import_nodes
            .insert("m.py".into(), BTreeSet::new());

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&graph).unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("nodes"));
        assert!(obj.contains_key("fileNodes"));
        assert!(obj.contains_key("fileImportNode"));
    }
}
