use crate::analyzer::extract::{DeclarationInput, LanguageAnalyzer, ProjectView, ResolveState};
use anyhow::Result;
use std::collections::BTreeSet;

// Stub analyzers. Files in these languages still get (empty) graph entries so
// downstream consumers see a stable key set per scanned file.
// TODO: wire tree-sitter-javascript and port the declaration walk.

pub struct JavascriptAnalyzer;

impl JavascriptAnalyzer {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

impl LanguageAnalyzer for JavascriptAnalyzer {
    fn language(&self) -> &'static str {
        "javascript"
    }

    fn extract_declarations(
        &mut self,
        _source: &str,
        _rel_path: &str,
    ) -> Result<Vec<DeclarationInput>> {
        Ok(Vec::new())
    }

    fn resolve_imports(
        &mut self,
        _source: &str,
        _rel_path: &str,
        _project: ProjectView<'_>,
        _state: &mut ResolveState,
    ) -> Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }
}

pub struct TypescriptAnalyzer;

impl TypescriptAnalyzer {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }
}

impl LanguageAnalyzer for TypescriptAnalyzer {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn extract_declarations(
        &mut self,
        _source: &str,
        _rel_path: &str,
    ) -> Result<Vec<DeclarationInput>> {
        Ok(Vec::new())
    }

    fn resolve_imports(
        &mut self,
        _source: &str,
        _rel_path: &str,
        _project: ProjectView<'_>,
        _state: &mut ResolveState,
    ) -> Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }
}
