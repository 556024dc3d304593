//! Configuration types deserialized from `weft.toml`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The top-level configuration parsed from `weft.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeftConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Elaboration options.
    #[serde(default)]
    pub elaborate: ElabOptions,
    /// Interchange export options.
    #[serde(default)]
    pub export: ExportOptions,
    /// Target PDK selection and installation data.
    #[serde(default)]
    pub pdk: PdkConfig,
}

impl WeftConfig {
    /// A configuration with default options for project `name`.
    pub fn new(name: impl Into<String>) -> Self {
        WeftConfig {
            project: ProjectMeta {
                name: name.into(),
                version: String::new(),
                description: String::new(),
            },
            elaborate: ElabOptions::default(),
            export: ExportOptions::default(),
            pdk: PdkConfig::default(),
        }
    }
}

/// Project metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// A brief description.
    #[serde(default)]
    pub description: String,
}

/// Options controlling generator elaboration and bundle flattening.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElabOptions {
    /// Separator joining flattened bundle signal paths, as in `outer.inner.p`.
    #[serde(default = "default_separator")]
    pub bundle_separator: String,
    /// Longest readable parameter suffix in generated module names; longer
    /// or structured parameters are hashed instead.
    #[serde(default = "default_max_readable")]
    pub max_readable_name: usize,
}

fn default_separator() -> String {
    ".".to_string()
}

fn default_max_readable() -> usize {
    128
}

impl Default for ElabOptions {
    fn default() -> Self {
        ElabOptions {
            bundle_separator: default_separator(),
            max_readable_name: default_max_readable(),
        }
    }
}

/// Options for the interchange export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportOptions {
    /// Domain string recorded in exported packages.
    #[serde(default)]
    pub domain: String,
}

/// PDK selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PdkConfig {
    /// Name of the PDK primitives are compiled for.
    #[serde(default)]
    pub name: Option<String>,
    /// Site-specific installation data for that PDK.
    #[serde(default)]
    pub install: Installation,
}

/// Opaque site-specific installation data (model paths and the like).
///
/// Entries are never interpreted by the library; a PDK checks only for the
/// presence and type of the keys it needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Installation {
    entries: BTreeMap<String, toml::Value>,
}

impl Installation {
    /// An empty installation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Returns the entry for `key`.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.entries.get(key)
    }

    /// Returns the string entry for `key`, failing if it is absent or not a string.
    pub fn require_str(&self, key: &str) -> Result<&str, ConfigError> {
        match self.entries.get(key) {
            Some(toml::Value::String(s)) => Ok(s),
            Some(other) => Err(ConfigError::ValidationError(format!(
                "pdk.install.{key} must be a string, found {}",
                other.type_str()
            ))),
            None => Err(ConfigError::MissingField(format!("pdk.install.{key}"))),
        }
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &toml::Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
