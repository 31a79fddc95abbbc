//! Reading `mdlink.config.json` and writing the `init` skeleton.
use std::path::Path;

use serde_json::json;

use super::Config;
use crate::error::ConfigError;

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "mdlink.config.json";

/// Load and resolve the config file at `path`.
///
/// `~` is expanded against `home`; relative paths are joined to
/// `project_root`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not a valid config document.
pub fn load(path: &Path, project_root: &Path, home: Option<&Path>) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_json(&content, project_root, home).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a skeleton config to `path`.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyExists`] rather than overwrite an existing
/// file, and [`ConfigError::Io`] if the write fails.
pub fn write_skeleton(path: &Path) -> Result<(), ConfigError> {
    if path.symlink_metadata().is_ok() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let mut content = serde_json::to_string_pretty(&skeleton())?;
    content.push('\n');
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn skeleton() -> serde_json::Value {
    json!({
        "base_modules_path": "~/gits/modules",
        "modules": {
            "example-module": {
                "url": "https://github.com/example/example-module",
                "path": "~/gits/modules/example-module"
            }
        }
    })
}
