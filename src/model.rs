use serde::{Deserialize, Serialize};

/// Classification of a top-level declaration.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Class,
    Variable,
    Other,
}

/// Source location of a declaration: relative path plus a 1-based,
/// end-inclusive line span covering the whole statement.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityLocation {
    pub relative_path: String,
    pub start_line: i64,
    pub end_line: i64,
}

/// A top-level declaration extracted from one file, keyed project-wide by its
/// fully-qualified dotted name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeEntity {
    pub fqn: String,
    pub kind: EntityKind,
    pub content: EntityLocation,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub used_by: Vec<String>,
}

/// Summary counters for one graph build.
#[derive(Debug, Default, Serialize)]
pub struct BuildStats {
    pub scanned: usize,
    pub analyzed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub declarations: usize,
    pub edges: usize,
    pub duration_ms: u64,
}

/// Per-file notification emitted during the declaration pass.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'a> {
    pub current: usize,
    pub total: usize,
    pub rel_path: &'a str,
}

impl ProgressEvent<'_> {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.current * 100 / self.total
        }
    }
}

// Visualization projection. Lossy by design: nodes are tagged by group, links
// only go from a file to the fqns it imports.

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct D3Node {
    pub id: String,
    pub group: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct D3Link {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct D3Graph {
    pub nodes: Vec<D3Node>,
    pub links: Vec<D3Link>,
}
