//! Harvester configuration, loaded from YAML
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```yaml
//! page_size: 100
//! max_depth: 32
//! type_failure: abort   # or: skip
//! element_types: [Asset, Glossary, GlossaryTerm, Collection, Project, Team, Location]
//! ```

use crate::graph::vocab::types;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Yaml(_) => "yaml",
            Self::Invalid { .. } => "invalid",
        }
    }
}

/// What a failed top-level page of one element type does to the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFailurePolicy {
    /// Roll back the whole run
    #[default]
    Abort,
    /// Audit the failure and continue with the next type
    Skip,
}

fn default_page_size() -> usize {
    100
}

fn default_max_depth() -> usize {
    32
}

fn default_element_types() -> Vec<String> {
    [
        types::ASSET,
        types::GLOSSARY,
        types::GLOSSARY_TERM,
        types::COLLECTION,
        types::PROJECT,
        types::TEAM,
        types::LOCATION,
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub type_failure: TypeFailurePolicy,
    /// Element types to synchronize, in order
    #[serde(default = "default_element_types")]
    pub element_types: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_depth: default_max_depth(),
            type_failure: TypeFailurePolicy::default(),
            element_types: default_element_types(),
        }
    }
}

impl SyncConfig {
    /// `<config dir>/metasync/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("metasync").join("config.yaml"))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // an empty document deserializes as null, not as an empty mapping
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Load from `path` if given, else from the default path if that file
    /// exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading default config");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "page_size",
                message: "must be greater than 0".into(),
            });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_depth",
                message: "must be greater than 0".into(),
            });
        }
        if self.element_types.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "element_types",
                message: "type names must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_type_failure(mut self, policy: TypeFailurePolicy) -> Self {
        self.type_failure = policy;
        self
    }

    pub fn with_element_types<I, S>(mut self, element_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.element_types = element_types.into_iter().map(Into::into).collect();
        self
    }
}
