//! Non-fatal configuration checks, reported before a run starts.
use std::path::{Component, Path};

use super::{Config, ModuleEntry};
use crate::resources::helpers::fs::{dir_is_empty, is_checkout};

/// Longest package name the npm registry accepts.
const NPM_NAME_MAX_LEN: usize = 214;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration source (e.g. "mdlink.config.json").
    pub source: String,
    /// The module or key that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Check `config` for problems that will likely fail the run later.
///
/// `source` names the file the config came from and is copied into each
/// warning.
#[must_use]
pub fn validate(config: &Config, source: &str) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    for module in &config.modules {
        if let Some(message) = npm_name_problem(&module.name) {
            warnings.push(ValidationWarning::new(source, &module.name, message));
        }
        warnings.extend(
            source_problem(module, config.base_modules_path.as_deref())
                .map(|message| ValidationWarning::new(source, &module.name, message)),
        );
    }
    warnings
}

fn source_problem(module: &ModuleEntry, base: Option<&Path>) -> Option<String> {
    match (&module.spec.path, &module.spec.url) {
        (None, None) => Some("module declares neither path nor url".to_string()),
        (None, Some(_)) if base.is_none() => {
            Some("url-only module needs base_modules_path to clone into".to_string())
        }
        (Some(path), Some(_)) if path.is_dir() && !is_checkout(path) && !dir_is_empty(path) => {
            Some(format!(
                "clone destination {} is a non-empty directory without a checkout",
                path.display()
            ))
        }
        (Some(path), None) if !path.exists() => {
            Some(format!("path {} does not exist", path.display()))
        }
        _ => None,
    }
}

/// Why `name` cannot be used as a directory under `node_modules`, if it can't.
///
/// The name must be relative and made only of plain components, so that
/// joining it onto a modules directory never leaves that directory.
#[must_use]
pub fn name_path_problem(name: &str) -> Option<&'static str> {
    let path = Path::new(name);
    if name.is_empty() {
        return Some("module name is empty");
    }
    if path.is_absolute() || path.has_root() {
        return Some("module name must not be an absolute path");
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Some("module name must not contain '.' or '..' path components");
    }
    if path.components().count() > 2 {
        return Some("module name has more than two path segments");
    }
    None
}

/// Why `name` would not be accepted as an npm package name, if it wouldn't.
fn npm_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("module name is empty");
    }
    if name.len() > NPM_NAME_MAX_LEN {
        return Some("module name is longer than 214 characters");
    }
    if name != name.to_lowercase() {
        return Some("module name must be lowercase");
    }
    let bare = match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, pkg)) if !scope.is_empty() && !pkg.is_empty() => pkg,
            _ => return Some("scoped module name must look like @scope/name"),
        },
        None => name,
    };
    if bare.starts_with('.') || bare.starts_with('_') {
        return Some("module name must not start with '.' or '_'");
    }
    let url_safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~');
    if !bare.chars().all(url_safe) {
        return Some("module name contains characters that are not URL-safe");
    }
    None
}
