use crate::config::Config;
use anyhow::Result;
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub rel_path: String,
    pub abs_path: PathBuf,
    pub size: i64,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct LanguageSpec {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub no_ignore: bool,
}

impl ScanOptions {
    pub fn new(no_ignore: bool) -> Self {
        Self { no_ignore }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { no_ignore: false }
    }
}

static LANGUAGE_SPECS: &[LanguageSpec] = &[
    LanguageSpec {
        name: "python",
        extensions: &["py"],
    },
    LanguageSpec {
        name: "javascript",
        extensions: &["js", "jsx", "mjs", "cjs"],
    },
    LanguageSpec {
        name: "typescript",
        extensions: &["ts", "tsx"],
    },
];

pub fn language_specs() -> &'static [LanguageSpec] {
    LANGUAGE_SPECS
}

pub fn scan_repo(root: &Path) -> Result<Vec<ScannedFile>> {
    scan_repo_with_options(root, ScanOptions::default())
}

pub fn scan_repo_with_options(root: &Path, options: ScanOptions) -> Result<Vec<ScannedFile>> {
    let mut files = Vec::new();
    let mut builder = WalkBuilder::new(root);
    if options.no_ignore {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
    } else {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    }
    let walker = builder
        .hidden(false)
        .filter_entry(|entry| !is_ignored_entry(entry))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                eprintln!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let language = match detect_language(path) {
            Some(value) => value,
            None => continue,
        };
        let rel_path = crate::util::normalize_rel_path(root, path)?;
        let metadata = fs::metadata(path)?;
        files.push(ScannedFile {
            rel_path,
            abs_path: path.to_path_buf(),
            size: metadata.len() as i64,
            language: language.to_string(),
        });
    }
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

fn is_ignored_entry(entry: &ignore::DirEntry) -> bool {
    let artifact_dir = Config::get().artifact_dir.as_str();
    match entry.file_name() {
        name if name == OsStr::new(artifact_dir) => true,
        name if name == OsStr::new(".git") => true,
        _ => false,
    }
}

pub fn scan_path(root: &Path, path: &Path) -> Result<Option<ScannedFile>> {
    if !path.is_file() {
        return Ok(None);
    }
    let language = match detect_language(path) {
        Some(value) => value,
        None => return Ok(None),
    };
    let rel_path = match crate::util::normalize_rel_path(root, path) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };
    let metadata = fs::metadata(path)?;
    Ok(Some(ScannedFile {
        rel_path,
        abs_path: path.to_path_buf(),
        size: metadata.len() as i64,
        language: language.to_string(),
    }))
}

fn detect_language(path: &Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    for spec in LANGUAGE_SPECS {
        if spec.extensions.iter().any(|candidate| *candidate == ext) {
            return Some(spec.name);
        }
    }
    None
}

pub fn language_for_path(path: &Path) -> Option<&'static str> {
    detect_language(path)
}
