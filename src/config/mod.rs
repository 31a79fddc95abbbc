//! The `mdlink.config.json` model.
//!
//! ```json
//! {
//!   "base_modules_path": "~/gits/modules",
//!   "modules": {
//!     "left-pad": { "path": "~/src/left-pad" },
//!     "right-pad": { "url": "https://github.com/me/right-pad" }
//!   }
//! }
//! ```
//!
//! Module order is significant: modules are linked and unlinked in the
//! order they are declared.
pub mod loader;
pub mod validation;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::{self, MapAccess, SeqAccess, Visitor};

/// Where one module's source comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSpec {
    /// Existing checkout, or the clone destination when `url` is also set.
    pub path: Option<PathBuf>,
    /// Repository to clone.
    pub url: Option<String>,
}

/// A named module in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    /// Package name; also the directory name under `node_modules`.
    pub name: String,
    /// Declared source.
    pub spec: ModuleSpec,
}

/// Loaded configuration with paths already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory that url-only modules are cloned into. `None` when the
    /// file leaves it empty.
    pub base_modules_path: Option<PathBuf>,
    /// Modules in declaration order.
    pub modules: Vec<ModuleEntry>,
}

impl Config {
    /// Parse a config document, resolving `~` against `home` and relative
    /// paths against `project_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON, does not match
    /// the expected shape, or declares a module twice.
    pub fn from_json(
        json: &str,
        project_root: &Path,
        home: Option<&Path>,
    ) -> Result<Self, serde_json::Error> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Ok(raw.resolve(project_root, home))
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    base_modules_path: Option<String>,
    #[serde(default)]
    modules: RawModules,
}

#[derive(Debug, Default, Deserialize)]
struct RawModuleSpec {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Ordered module list. Accepts an object (`{"a": {...}}`) or an array of
/// objects (`[{"a": {...}}, {"b": {...}}]`).
#[derive(Debug, Default)]
struct RawModules(Vec<(String, RawModuleSpec)>);

impl RawModules {
    fn push<E: de::Error>(
        &mut self,
        seen: &mut HashSet<String>,
        name: String,
        spec: RawModuleSpec,
    ) -> Result<(), E> {
        if !seen.insert(name.clone()) {
            return Err(E::custom(format!("module '{name}' is declared more than once")));
        }
        self.0.push((name, spec));
        Ok(())
    }
}

impl<'de> Deserialize<'de> for RawModules {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ModulesVisitor)
    }
}

struct ModulesVisitor;

impl<'de> Visitor<'de> for ModulesVisitor {
    type Value = RawModules;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of modules or an array of single-module objects")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawModules::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut modules = RawModules::default();
        let mut seen = HashSet::new();
        while let Some((name, spec)) = map.next_entry::<String, RawModuleSpec>()? {
            modules.push(&mut seen, name, spec)?;
        }
        Ok(modules)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut modules = RawModules::default();
        let mut seen = HashSet::new();
        while let Some(RawModules(group)) = seq.next_element::<RawModules>()? {
            for (name, spec) in group {
                modules.push(&mut seen, name, spec)?;
            }
        }
        Ok(modules)
    }
}

impl RawConfig {
    fn resolve(self, project_root: &Path, home: Option<&Path>) -> Config {
        let to_path = |raw: Option<String>| {
            non_empty(raw).map(|s| absolutize(&expand_home(&s, home), project_root))
        };
        Config {
            base_modules_path: to_path(self.base_modules_path),
            modules: self
                .modules
                .0
                .into_iter()
                .map(|(name, spec)| ModuleEntry {
                    name,
                    spec: ModuleSpec {
                        path: to_path(spec.path),
                        url: non_empty(spec.url),
                    },
                })
                .collect(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Expand a leading `~` or `~/` to `home`. Other paths are returned as-is.
#[must_use]
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (_, Some(home)) if raw.starts_with("~/") => home.join(raw.trim_start_matches("~/")),
        _ => PathBuf::from(raw),
    }
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
