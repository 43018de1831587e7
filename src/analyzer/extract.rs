use crate::model::EntityKind;
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One top-level declaration as produced by a language analyzer, before the
/// assembler attaches the file path and registers it in the graph.
#[derive(Debug, Clone)]
pub struct DeclarationInput {
    pub kind: EntityKind,
    pub name: String,
    pub fqn: String,
    pub start_line: i64,
    pub end_line: i64,
}

/// Read-only view of the whole project handed to the import-edge pass.
/// `file_nodes` must be fully populated (declaration pass over every file)
/// before any file's imports are resolved.
#[derive(Debug, Clone, Copy)]
pub struct ProjectView<'a> {
    pub rel_paths: &'a [String],
    pub file_nodes: &'a BTreeMap<String, Vec<String>>,
}

/// Mutable resolver state threaded through one build. Holds the re-export
/// table accumulated while processing package index files; a fresh instance
/// is created per build so repeated scans cannot cross-contaminate.
#[derive(Debug, Default)]
pub struct ResolveState {
    /// Package index file path -> exported local name -> original declaration fqn.
    pub init_exports: HashMap<String, BTreeMap<String, String>>,
}

impl ResolveState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Per-language analysis capability. One concrete implementation per grammar;
/// dispatch is by language name from the scan registry.
pub trait LanguageAnalyzer {
    fn language(&self) -> &'static str;

    /// Walk one file's top-level statements and emit its declarations in
    /// source order.
    fn extract_declarations(
        &mut self,
        source: &str,
        rel_path: &str,
    ) -> Result<Vec<DeclarationInput>>;

    /// Resolve the file's import statements against the project and return
    /// the fqns the file both imports and uses.
    fn resolve_imports(
        &mut self,
        source: &str,
        rel_path: &str,
        project: ProjectView<'_>,
        state: &mut ResolveState,
    ) -> Result<BTreeSet<String>>;

    /// Whether a file acts as a package index whose re-exports other files
    /// can observe. Index files are processed first in the edge pass.
    fn is_package_index(&self, _rel_path: &str) -> bool {
        false
    }
}
