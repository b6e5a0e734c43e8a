//! Configuration and collection resolution.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Site configuration against which collections resolve.
///
/// A config can be built directly or loaded from a JSON file, e.g.
///
/// ```json
/// { "parent_dir": "site" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Base directory for collection lookups.
    #[serde(default)]
    parent_dir: PathBuf,
}

impl Config {
    /// Construct a config rooted at the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            Error::msg(format!("failed to read config `{}`: {err}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            Error::msg(format!("failed to parse config `{}`: {err}", path.display()))
        })
    }

    /// Set the base directory for collection lookups.
    pub fn set_parent_dir(&mut self, dir: impl Into<PathBuf>) {
        self.parent_dir = dir.into();
    }

    /// The base directory for collection lookups.
    pub fn parent_dir(&self) -> &Path {
        &self.parent_dir
    }
}

/// Resolves collection names against a [`Config`]'s base directory.
pub struct Resolver<'config> {
    config: &'config Config,
}

impl<'config> Resolver<'config> {
    /// Construct a resolver over the given config.
    pub fn new(config: &'config Config) -> Self {
        Self { config }
    }

    /// Resolve a collection name to its entries, ordered by file name.
    pub fn resolve(&self, name: &str) -> Result<Vec<PathBuf>> {
        let dir = self.config.parent_dir.join(name);
        let entries = fs::read_dir(&dir).map_err(|err| {
            Error::msg(format!(
                "failed to resolve collection `{name}` at `{}`: {err}",
                dir.display()
            ))
        })?;
        let mut items = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|err| Error::msg(format!("failed to read collection `{name}`: {err}")))?;
            let path = entry.path();
            if path.is_file() {
                items.push(path);
            }
        }
        items.sort();
        Ok(items)
    }
}
