use crate::analyzer::extract::{DeclarationInput, LanguageAnalyzer, ProjectView, ResolveState};
use crate::model::EntityKind;
use crate::util;
use anyhow::Result;
use std::collections::{BTreeSet, HashMap};
use tree_sitter::{Node, Parser};

const EXT: &str = "py";

pub struct PythonAnalyzer {
    parser: Parser,
}

impl PythonAnalyzer {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extract_declarations(
        &mut self,
        source: &str,
        rel_path: &str,
    ) -> Result<Vec<DeclarationInput>> {
        let mut decls = Vec::new();
        let Some(tree) = self.parser.parse(source, None) else {
            return Ok(decls);
        };
        let root = tree.root_node();
        let prefix = package_prefix(rel_path);
        for i in 0..root.named_child_count() {
            let Some(node) = root.named_child(i) else {
                continue;
            };
            let Some((kind, name)) = classify_statement(node, source) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let fqn = join_fqn(&prefix, &name);
            let (start_line, end_line) = line_span(node);
            decls.push(DeclarationInput {
                kind,
                name,
                fqn,
                start_line,
                end_line,
            });
        }
        Ok(decls)
    }

    fn resolve_imports(
        &mut self,
        source: &str,
        rel_path: &str,
        project: ProjectView<'_>,
        state: &mut ResolveState,
    ) -> Result<BTreeSet<String>> {
        let mut edges = BTreeSet::new();
        let Some(tree) = self.parser.parse(source, None) else {
            return Ok(edges);
        };
        let root = tree.root_node();

        // local binding table, rebuilt per file; re-exports persist across
        // files only via ResolveState::init_exports
        let mut imported: HashMap<String, String> = HashMap::new();
        let this_is_index = is_init_file(rel_path);

        let mut import_nodes = Vec::new();
        collect_import_statements(root, &mut import_nodes);
        for node in import_nodes {
            bind_import_statement(
                node,
                source,
                rel_path,
                this_is_index,
                project,
                state,
                &mut imported,
                &mut edges,
            );
        }

        collect_uses(root, source, &imported, &mut edges);
        Ok(edges)
    }

    fn is_package_index(&self, rel_path: &str) -> bool {
        is_init_file(rel_path)
    }
}

/// Dotted namespace prefix for declarations in a file: the relative path with
/// separators turned into dots, minus the final dot segment. For a regular
/// `pkg/mod.py` that strips the extension and yields `pkg.mod`; for an index
/// file it yields `pkg.__init__`. Preserved exactly as the consuming layer
/// expects it, including the odd cases for dotted file names.
pub fn package_prefix(rel_path: &str) -> String {
    let dotted = rel_path.replace('/', ".");
    match dotted.rsplit_once('.') {
        Some((head, _)) => head.to_string(),
        None => String::new(),
    }
}

fn join_fqn(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn is_init_file(rel_path: &str) -> bool {
    util::file_stem(rel_path) == "__init__"
}

fn classify_statement(node: Node<'_>, source: &str) -> Option<(EntityKind, String)> {
    match node.kind() {
        "function_definition" | "async_function_definition" => {
            let name = node_text(node.child_by_field_name("name")?, source);
            Some((EntityKind::Function, name))
        }
        "class_definition" => {
            let name = node_text(node.child_by_field_name("name")?, source);
            Some((EntityKind::Class, name))
        }
        "decorated_definition" => {
            // unwrap to the wrapped definition; anything else under the
            // decorator is skipped
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "function_definition" | "async_function_definition" => {
                        let name = node_text(child.child_by_field_name("name")?, source);
                        return Some((EntityKind::Function, name));
                    }
                    "class_definition" => {
                        let name = node_text(child.child_by_field_name("name")?, source);
                        return Some((EntityKind::Class, name));
                    }
                    _ => {}
                }
            }
            None
        }
        "expression_statement" => {
            let child = node.named_child(0)?;
            match child.kind() {
                "assignment" => {
                    let left = child.child_by_field_name("left")?;
                    if left.kind() == "identifier" {
                        Some((EntityKind::Variable, node_text(left, source)))
                    } else {
                        None
                    }
                }
                "identifier" => Some((EntityKind::Variable, node_text(child, source))),
                _ => None,
            }
        }
        "global_statement" => {
            if node.named_child_count() != 1 {
                return None;
            }
            let ident = node.named_child(0)?;
            if ident.kind() == "identifier" {
                Some((EntityKind::Variable, node_text(ident, source)))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Imports may sit inside function or class bodies (conditional and lazy
/// imports), so the whole tree is searched, skipping literal text.
fn collect_import_statements<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    match node.kind() {
        "import_statement" | "import_from_statement" | "future_import_statement" => {
            out.push(node);
            return;
        }
        "comment" | "string" => return,
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_import_statements(child, out);
    }
}

#[allow(clippy::too_many_arguments)]
fn bind_import_statement(
    node: Node<'_>,
    source: &str,
    rel_path: &str,
    this_is_index: bool,
    project: ProjectView<'_>,
    state: &mut ResolveState,
    imported: &mut HashMap<String, String>,
    edges: &mut BTreeSet<String>,
) {
    match node.kind() {
        "import_statement" => {
            // `import a.b` and `import a.b as m` are modeled as whole-module
            // imports of each named target
            let mut cursor = node.walk();
            let names: Vec<Node<'_>> = node.children_by_field_name("name", &mut cursor).collect();
            for name_node in names {
                let module_path = match name_node.kind() {
                    "aliased_import" => name_node
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source)),
                    _ => Some(node_text(name_node, source)),
                };
                let Some(module_path) = module_path else {
                    continue;
                };
                let Some(target) = resolve_module_path(&module_path, rel_path, project.rel_paths)
                else {
                    continue;
                };
                bind_whole_module(
                    &target,
                    rel_path,
                    this_is_index,
                    project,
                    state,
                    imported,
                    edges,
                );
            }
        }
        "import_from_statement" => {
            let Some(module_node) = node.child_by_field_name("module_name") else {
                return;
            };
            let module_path = node_text(module_node, source);
            let Some(target) = resolve_module_path(&module_path, rel_path, project.rel_paths)
            else {
                return;
            };

            let mut cursor = node.walk();
            let names: Vec<Node<'_>> = node.children_by_field_name("name", &mut cursor).collect();
            if names.is_empty() {
                // wildcard form: everything the target declares or re-exports
                // becomes reachable under its bare name
                bind_whole_module(
                    &target,
                    rel_path,
                    this_is_index,
                    project,
                    state,
                    imported,
                    edges,
                );
                return;
            }
            for name_node in names {
                let (symbol, alias) = match name_node.kind() {
                    "aliased_import" => (
                        name_node
                            .child_by_field_name("name")
                            .map(|n| node_text(n, source)),
                        name_node
                            .child_by_field_name("alias")
                            .map(|n| node_text(n, source)),
                    ),
                    _ => (Some(node_text(name_node, source)), None),
                };
                let Some(symbol) = symbol else {
                    continue;
                };
                if symbol.is_empty() {
                    continue;
                }
                // a symbol re-exported by a package index resolves to its
                // original declaration site, not to the index itself
                let fqn = lookup_reexport(&target, &symbol, state)
                    .unwrap_or_else(|| join_fqn(&package_prefix(&target), &symbol));
                let local = alias.filter(|a| !a.is_empty()).unwrap_or(symbol);
                bind(local, fqn, rel_path, this_is_index, state, imported, edges);
            }
        }
        _ => {}
    }
}

fn lookup_reexport(target: &str, symbol: &str, state: &ResolveState) -> Option<String> {
    if !is_init_file(target) {
        return None;
    }
    state.init_exports.get(target)?.get(symbol).cloned()
}

fn bind_whole_module(
    target: &str,
    rel_path: &str,
    this_is_index: bool,
    project: ProjectView<'_>,
    state: &mut ResolveState,
    imported: &mut HashMap<String, String>,
    edges: &mut BTreeSet<String>,
) {
    let declared = project.file_nodes.get(target).cloned().unwrap_or_default();
    for fqn in declared {
        let local = util::last_dotted_segment(&fqn).to_string();
        bind(
            local,
            fqn,
            rel_path,
            this_is_index,
            state,
            imported,
            edges,
        );
    }
    if is_init_file(target) {
        if let Some(exports) = state.init_exports.get(target).cloned() {
            for (local, fqn) in exports {
                bind(local, fqn, rel_path, this_is_index, state, imported, edges);
            }
        }
    }
}

/// Record a binding. A package index additionally publishes the binding for
/// downstream importers and counts the re-export itself as a use.
fn bind(
    local: String,
    fqn: String,
    rel_path: &str,
    this_is_index: bool,
    state: &mut ResolveState,
    imported: &mut HashMap<String, String>,
    edges: &mut BTreeSet<String>,
) {
    if this_is_index {
        state
            .init_exports
            .entry(rel_path.to_string())
            .or_default()
            .insert(local.clone(), fqn.clone());
        edges.insert(fqn.clone());
    }
    imported.insert(local, fqn);
}

/// Map a dotted module path from an import statement to a project file.
/// Absolute paths are matched by path suffix (imports are often rooted below
/// the scanned directory); relative paths resolve against the importer's own
/// directory, one extra leading dot per parent hop. Unresolvable paths yield
/// None and the import contributes nothing.
fn resolve_module_path(module_path: &str, importer: &str, files: &[String]) -> Option<String> {
    let module_path = module_path.trim();
    if module_path.is_empty() {
        return None;
    }
    let dots = module_path.chars().take_while(|ch| *ch == '.').count();
    if dots == 0 {
        let path = module_path.replace('.', "/");
        let init_candidate = format!("{path}/__init__.{EXT}");
        if let Some(found) = find_by_suffix(files, &init_candidate) {
            return Some(found);
        }
        let module_candidate = format!("{path}.{EXT}");
        return find_by_suffix(files, &module_candidate);
    }

    let remainder = &module_path[dots..];
    let mut dir = util::parent_dir(importer).to_string();
    for _ in 1..dots {
        if dir.is_empty() {
            return None;
        }
        dir = util::parent_dir(&dir).to_string();
    }
    let resolved = if remainder.is_empty() {
        dir
    } else {
        let rel = remainder.replace('.', "/");
        if dir.is_empty() {
            rel
        } else {
            format!("{dir}/{rel}")
        }
    };
    if resolved.is_empty() {
        return None;
    }

    let module_candidate = format!("{resolved}.{EXT}");
    if files.iter().any(|file| file == &module_candidate) {
        return Some(module_candidate);
    }
    let init_candidate = format!("{resolved}/__init__.{EXT}");
    if files.iter().any(|file| file == &init_candidate) {
        return Some(init_candidate);
    }
    None
}

fn find_by_suffix(files: &[String], candidate: &str) -> Option<String> {
    files
        .iter()
        .find(|file| {
            file.as_str() == candidate
                || (file.len() > candidate.len()
                    && file.ends_with(candidate)
                    && file.as_bytes()[file.len() - candidate.len() - 1] == b'/')
        })
        .cloned()
}

/// Known-approximate use detection: any identifier token sitting where the
/// grammar reads a value counts as a use of that name. A local variable
/// shadowing an imported name still counts, and some genuine uses are missed.
/// Do not tighten this into scope-accurate resolution; observable edge sets
/// are defined by this pass.
fn collect_uses(
    node: Node<'_>,
    source: &str,
    imported: &HashMap<String, String>,
    edges: &mut BTreeSet<String>,
) {
    match node.kind() {
        "comment" => return,
        "import_statement" | "import_from_statement" | "future_import_statement" => return,
        "global_statement" | "nonlocal_statement" => return,
        "string" => {
            // literal text is opaque; interpolation segments are real code
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "interpolation" {
                    collect_uses_children(child, source, imported, edges);
                }
            }
            return;
        }
        "identifier" => {
            let text = node_text(node, source);
            if let Some(fqn) = imported.get(&text) {
                edges.insert(fqn.clone());
            }
            return;
        }
        "assignment" | "augmented_assignment" => {
            // targets are bindings, not reads
            if let Some(annotation) = node.child_by_field_name("type") {
                collect_uses(annotation, source, imported, edges);
            }
            if let Some(right) = node.child_by_field_name("right") {
                collect_uses(right, source, imported, edges);
            }
            return;
        }
        "function_definition" | "async_function_definition" | "class_definition" => {
            let name_id = node.child_by_field_name("name").map(|n| n.id());
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if Some(child.id()) == name_id {
                    continue;
                }
                collect_uses(child, source, imported, edges);
            }
            return;
        }
        "keyword_argument" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_uses(value, source, imported, edges);
            }
            return;
        }
        "attribute" => {
            // only the object side of `a.b` is a plain read
            if let Some(object) = node.child_by_field_name("object") {
                collect_uses(object, source, imported, edges);
            }
            return;
        }
        "as_pattern" => {
            // `except E as e` / `with ctx as v`: the value is read, the
            // bound alias is not
            if let Some(value) = node.named_child(0) {
                collect_uses(value, source, imported, edges);
            }
            return;
        }
        _ => {}
    }
    collect_uses_children(node, source, imported, edges);
}

fn collect_uses_children(
    node: Node<'_>,
    source: &str,
    imported: &HashMap<String, String>,
    edges: &mut BTreeSet<String>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_uses(child, source, imported, edges);
    }
}

fn line_span(node: Node<'_>) -> (i64, i64) {
    (
        node.start_position().row as i64 + 1,
        node.end_position().row as i64 + 1,
    )
}

fn node_text(node: Node<'_>, source: &str) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    source.get(start..end).unwrap_or("").trim().to_string()
}
