use crate::analyzer::extract::{LanguageAnalyzer, ProjectView, ResolveState};
use crate::config::Config;
use crate::graph::Graph;
use crate::model::{BuildStats, CodeEntity, EntityLocation, ProgressEvent};
use crate::util;
use anyhow::{Result, anyhow};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Instant;

pub mod extract;
pub mod javascript;
pub mod python;
pub mod scan;

/// Result of one full project analysis. The artifact on disk is the same
/// graph that is returned in memory.
pub struct BuildOutcome {
    pub graph: Graph,
    pub stats: BuildStats,
    pub artifact_path: PathBuf,
}

pub struct Analyzer {
    root: PathBuf,
    scan_options: scan::ScanOptions,
    analyzers: HashMap<String, Box<dyn LanguageAnalyzer>>,
}

impl Analyzer {
    pub fn new(root: PathBuf) -> Result<Self> {
        Self::with_options(root, scan::ScanOptions::default())
    }

    pub fn with_options(root: PathBuf, scan_options: scan::ScanOptions) -> Result<Self> {
        let root = std::fs::canonicalize(&root).unwrap_or(root);

        let mut analyzers: HashMap<String, Box<dyn LanguageAnalyzer>> = HashMap::new();
        analyzers.insert("python".into(), Box::new(python::PythonAnalyzer::new()?));
        analyzers.insert(
            "javascript".into(),
            Box::new(javascript::JavascriptAnalyzer::new()?),
        );
        analyzers.insert(
            "typescript".into(),
            Box::new(javascript::TypescriptAnalyzer::new()?),
        );

        Ok(Self {
            root,
            scan_options,
            analyzers,
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn scan_files(&self) -> Result<Vec<scan::ScannedFile>> {
        scan::scan_repo_with_options(&self.root, self.scan_options)
    }

    pub fn build_graph(&mut self) -> Result<BuildOutcome> {
        self.build_graph_with_progress(&mut |_| {})
    }

    /// Two full passes over the project: declarations for every file, then
    /// import edges once all declaration lists exist. One sub-graph per
    /// language, merged at the end, serialized, persisted, and returned.
    pub fn build_graph_with_progress(
        &mut self,
        progress: &mut dyn FnMut(ProgressEvent<'_>),
    ) -> Result<BuildOutcome> {
        let started = Instant::now();
        let scanned = self.scan_files()?;
        let mut stats = BuildStats {
            scanned: scanned.len(),
            ..Default::default()
        };

        let max_bytes = Config::get().max_file_size_mb.saturating_mul(1024 * 1024);
        let mut by_language: BTreeMap<String, Vec<(scan::ScannedFile, String)>> = BTreeMap::new();
        for file in scanned {
            if !self.analyzers.contains_key(file.language.as_str()) {
                stats.skipped += 1;
                continue;
            }
            if file.size as u64 > max_bytes {
                eprintln!(
                    "codegraph: skipping large file ({}MB): {}",
                    (file.size as u64) / (1024 * 1024),
                    file.rel_path
                );
                stats.skipped += 1;
                continue;
            }
            // read failures are fatal for the whole run; the caller decides
            // whether to rescan
            let source = util::read_to_string(&file.abs_path)?;
            by_language
                .entry(file.language.clone())
                .or_default()
                .push((file, source));
        }

        let total: usize = by_language.values().map(|files| files.len()).sum();
        let mut current = 0usize;
        let mut sub_graphs = Vec::new();
        for (language, files) in &by_language {
            let analyzer = self
                .analyzers
                .get_mut(language.as_str())
                .expect("language grouped without analyzer");
            let sub = build_language_graph(
                analyzer.as_mut(),
                files,
                &mut stats,
                &mut current,
                total,
                progress,
            )?;
            sub_graphs.push(sub);
        }

        let graph = Graph::merge(sub_graphs);
        stats.declarations = graph.declaration_count();
        stats.edges = graph.edge_count();

        let artifact_path = Graph::artifact_path(&self.root);
        graph.write_to(&artifact_path)?;
        stats.duration_ms = started.elapsed().as_millis() as u64;

        Ok(BuildOutcome {
            graph,
            stats,
            artifact_path,
        })
    }

    /// Declarations of a single scanned file, as graph entities.
    pub fn extract_file_declarations(
        &mut self,
        file: &scan::ScannedFile,
    ) -> Result<Vec<CodeEntity>> {
        let analyzer = self
            .analyzers
            .get_mut(file.language.as_str())
            .ok_or_else(|| anyhow!("skip {}: unknown language {}", file.rel_path, file.language))?;
        let source = util::read_to_string(&file.abs_path)?;
        let decls = analyzer.extract_declarations(&source, &file.rel_path)?;
        Ok(decls
            .into_iter()
            .map(|decl| to_entity(decl, &file.rel_path))
            .collect())
    }
}

fn to_entity(decl: extract::DeclarationInput, rel_path: &str) -> CodeEntity {
    CodeEntity {
        fqn: decl.fqn,
        kind: decl.kind,
        content: EntityLocation {
            relative_path: rel_path.to_string(),
            start_line: decl.start_line,
            end_line: decl.end_line,
        },
        uses: Vec::new(),
        used_by: Vec::new(),
    }
}

fn build_language_graph(
    analyzer: &mut dyn LanguageAnalyzer,
    files: &[(scan::ScannedFile, String)],
    stats: &mut BuildStats,
    current: &mut usize,
    total: usize,
    progress: &mut dyn FnMut(ProgressEvent<'_>),
) -> Result<Graph> {
    let mut graph = Graph::new();

    // pass 1: declarations; every analyzed file gets a file_nodes entry even
    // when it declares nothing
    for (file, source) in files {
        *current += 1;
        progress(ProgressEvent {
            current: *current,
            total,
            rel_path: &file.rel_path,
        });
        let decls = match analyzer.extract_declarations(source, &file.rel_path) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("extract error {}: {err}", file.rel_path);
                stats.errors += 1;
                graph.file_nodes.insert(file.rel_path.clone(), Vec::new());
                continue;
            }
        };
        let mut fqns = Vec::with_capacity(decls.len());
        for decl in decls {
            fqns.push(decl.fqn.clone());
            // same-name collisions overwrite; last declaration wins
            graph
                .nodes
                .insert(decl.fqn.clone(), to_entity(decl, &file.rel_path));
        }
        graph.file_nodes.insert(file.rel_path.clone(), fqns);
        stats.analyzed += 1;
    }

    // pass 2: import edges. Package index files run first so their re-export
    // tables exist before any importer needs them; this ordering is the only
    // cross-file dependency in the pass and rules out processing in parallel.
    let rel_paths: Vec<String> = files.iter().map(|(file, _)| file.rel_path.clone()).collect();
    let mut ordered: Vec<&(scan::ScannedFile, String)> = files.iter().collect();
    ordered.sort_by_key(|entry| !analyzer.is_package_index(&entry.0.rel_path));
    let mut state = ResolveState::new();
    for (file, source) in ordered {
        let project = ProjectView {
            rel_paths: &rel_paths,
            file_nodes: &graph.file_nodes,
        };
        let edges = match analyzer.resolve_imports(source, &file.rel_path, project, &mut state) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("resolve error {}: {err}", file.rel_path);
                stats.errors += 1;
                BTreeSet::new()
            }
        };
        graph
            .file_import_nodes
            .entry(file.rel_path.clone())
            .or_default()
            .extend(edges);
    }

    Ok(graph)
}
