use crate::analyzer::scan::ScannedFile;
use crate::model::{CodeEntity, EntityKind};
use crate::util;
use std::collections::{BTreeMap, BTreeSet};

pub const PLACEHOLDER_FOLDER: &str = "[folder]";
pub const PLACEHOLDER_FILE: &str = "[file]";
pub const PLACEHOLDER_FUNCTION: &str = "[function]";
pub const PLACEHOLDER_VARIABLE: &str = "[variable]";
pub const PLACEHOLDER_CLASS: &str = "[class]";

/// Placeholder kind -> instance strings a question template can be
/// instantiated with.
pub type PlaceholderInstances = BTreeMap<String, Vec<String>>;

/// Locator for one declaration: `relativePath#startLine#name`.
pub fn locator(rel_path: &str, line: i64, name: &str) -> String {
    format!("{rel_path}#{line}#{name}")
}

/// Final `#`-delimited field of a locator.
pub fn locator_name(locator: &str) -> &str {
    locator.rsplit('#').next().unwrap_or(locator)
}

/// Bucket declaration records into function/class/variable placeholder
/// instances.
pub fn declaration_instances(entities: &[CodeEntity]) -> PlaceholderInstances {
    let mut out = PlaceholderInstances::new();
    out.insert(PLACEHOLDER_FUNCTION.to_string(), Vec::new());
    out.insert(PLACEHOLDER_VARIABLE.to_string(), Vec::new());
    out.insert(PLACEHOLDER_CLASS.to_string(), Vec::new());
    for entity in entities {
        let key = match entity.kind {
            EntityKind::Function => PLACEHOLDER_FUNCTION,
            EntityKind::Class => PLACEHOLDER_CLASS,
            EntityKind::Variable => PLACEHOLDER_VARIABLE,
            EntityKind::Other => continue,
        };
        let name = util::last_dotted_segment(&entity.fqn);
        if let Some(bucket) = out.get_mut(key) {
            bucket.push(locator(
                &entity.content.relative_path,
                entity.content.start_line,
                name,
            ));
        }
    }
    out
}

/// File and folder instances for the scanned workspace.
pub fn workspace_instances(files: &[ScannedFile]) -> PlaceholderInstances {
    let mut out = PlaceholderInstances::new();
    let mut folders = BTreeSet::new();
    let mut paths = Vec::new();
    for file in files {
        paths.push(file.rel_path.clone());
        let mut dir = util::parent_dir(&file.rel_path);
        while !dir.is_empty() {
            folders.insert(dir.to_string());
            dir = util::parent_dir(dir);
        }
    }
    out.insert(PLACEHOLDER_FILE.to_string(), paths);
    out.insert(
        PLACEHOLDER_FOLDER.to_string(),
        folders.into_iter().collect(),
    );
    out
}

/// A question template carrying exactly one `[...]` placeholder.
#[derive(Debug, Clone)]
pub struct QuestionTemplate {
    pub template: String,
    pub placeholder: String,
}

impl QuestionTemplate {
    pub fn new(template: &str) -> Self {
        let placeholder = match find_placeholder(template) {
            Some(value) => value,
            None => {
                eprintln!("codegraph: question template has no placeholder: {template}");
                "[]".to_string()
            }
        };
        Self {
            template: template.to_string(),
            placeholder,
        }
    }

    pub fn instantiate(&self, instance: &str) -> String {
        self.template.replacen(&self.placeholder, instance, 1)
    }
}

fn find_placeholder(template: &str) -> Option<String> {
    let start = template.find('[')?;
    let end = template[start..].find(']')?;
    Some(template[start..start + end + 1].to_string())
}
