use codegraph::analyzer::extract::{LanguageAnalyzer, ProjectView, ResolveState};
use codegraph::analyzer::python::PythonAnalyzer;
use std::collections::{BTreeMap, BTreeSet};

struct Fixture {
    rel_paths: Vec<String>,
    file_nodes: BTreeMap<String, Vec<String>>,
}

impl Fixture {
    fn new(files: &[(&str, &[&str])]) -> Self {
        let rel_paths = files.iter().map(|(path, _)| path.to_string()).collect();
        let file_nodes = files
            .iter()
            .map(|(path, fqns)| {
                (
                    path.to_string(),
                    fqns.iter().map(|f| f.to_string()).collect(),
                )
            })
            .collect();
        Self {
            rel_paths,
            file_nodes,
        }
    }

    fn view(&self) -> ProjectView<'_> {
        ProjectView {
            rel_paths: &self.rel_paths,
            file_nodes: &self.file_nodes,
        }
    }
}

fn edges(value: &[&str]) -> BTreeSet<String> {
    value.iter().map(|v| v.to_string()).collect()
}

#[test]
fn relative_import_depth_resolves_against_grandparent() {
    let fixture = Fixture::new(&[
        ("a/__init__.py", &["a.__init__.helper"]),
        ("a/b/c.py", &[]),
    ]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "from .. import helper\nhelper()\n",
            "a/b/c.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(resolved, edges(&["a.__init__.helper"]));
}

#[test]
fn relative_import_escaping_the_root_is_skipped() {
    let fixture = Fixture::new(&[("top.py", &["top.f"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "from ... import f\nf()\n",
            "top.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn unused_import_contributes_no_edge() {
    let fixture = Fixture::new(&[("unused_module.py", &["unused_module.thing"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "import unused_module\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn whole_module_import_binds_bare_declaration_names() {
    let fixture = Fixture::new(&[("pkg/a.py", &["pkg.a.foo", "pkg.a.Bar"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "import pkg.a\nfoo()\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(resolved, edges(&["pkg.a.foo"]));
}

#[test]
fn aliased_import_binds_alias_only() {
    let fixture = Fixture::new(&[("mod.py", &["mod.f"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();

    let mut state = ResolveState::new();
    let used_via_alias = analyzer
        .resolve_imports(
            "from mod import f as g\ng()\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(used_via_alias, edges(&["mod.f"]));

    let mut state = ResolveState::new();
    let original_name_is_unbound = analyzer
        .resolve_imports(
            "from mod import f as g\nf()\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert!(original_name_is_unbound.is_empty());
}

#[test]
fn init_reexport_chains_to_original_declaration() {
    let fixture = Fixture::new(&[
        ("pkg/__init__.py", &[]),
        ("pkg/a.py", &["pkg.a.foo"]),
        ("main.py", &[]),
    ]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();

    // package index first, matching the edge-pass ordering
    let init_edges = analyzer
        .resolve_imports(
            "from .a import foo\n",
            "pkg/__init__.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    // the index itself counts the re-export as a use
    assert_eq!(init_edges, edges(&["pkg.a.foo"]));

    let main_edges = analyzer
        .resolve_imports(
            "from pkg import foo\nfoo()\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(main_edges, edges(&["pkg.a.foo"]));
}

#[test]
fn wildcard_import_absorbs_init_reexports() {
    let fixture = Fixture::new(&[
        ("pkg/__init__.py", &[]),
        ("pkg/a.py", &["pkg.a.foo"]),
    ]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();

    analyzer
        .resolve_imports(
            "from .a import foo\n",
            "pkg/__init__.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();

    let resolved = analyzer
        .resolve_imports(
            "from pkg import *\nfoo()\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(resolved, edges(&["pkg.a.foo"]));
}

#[test]
fn strings_and_comments_are_not_uses() {
    let fixture = Fixture::new(&[("mod.py", &["mod.f"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "from mod import f\n# f\ns = \"f\"\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn fstring_interpolation_is_a_use() {
    let fixture = Fixture::new(&[("mod.py", &["mod.f"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "from mod import f\ns = f\"value: {f}\"\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(resolved, edges(&["mod.f"]));
}

#[test]
fn import_inside_function_body_is_found() {
    let fixture = Fixture::new(&[("mod.py", &["mod.f"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "def lazy():\n    from mod import f\n    return f\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(resolved, edges(&["mod.f"]));
}

#[test]
fn assignment_target_is_not_a_use_but_object_reads_are() {
    let fixture = Fixture::new(&[("mod.py", &["mod.f"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();

    let mut state = ResolveState::new();
    let rebound = analyzer
        .resolve_imports(
            "from mod import f\nf = 3\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert!(rebound.is_empty());

    let mut state = ResolveState::new();
    let object_read = analyzer
        .resolve_imports(
            "from mod import f\nx = f.attr\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(object_read, edges(&["mod.f"]));
}

#[test]
fn unresolvable_import_is_skipped_silently() {
    let fixture = Fixture::new(&[("mod.py", &["mod.f"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "from nowhere import f\nimport also.nowhere\nf()\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn repeated_uses_collapse_into_a_set() {
    let fixture = Fixture::new(&[("mod.py", &["mod.f"])]);
    let mut analyzer = PythonAnalyzer::new().unwrap();
    let mut state = ResolveState::new();
    let resolved = analyzer
        .resolve_imports(
            "from mod import f\nf()\nf()\nf(f)\n",
            "main.py",
            fixture.view(),
            &mut state,
        )
        .unwrap();
    assert_eq!(resolved, edges(&["mod.f"]));
}
