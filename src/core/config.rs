//! Layered YAML configuration

use serde_yaml::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for configuration loading and merging
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config layer {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config layer {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config layer {path} is not a mapping")]
    NotAMapping { path: PathBuf },

    #[error("cannot merge a {incoming} into a {existing} at '{path}'")]
    MergeConflict {
        path: String,
        existing: &'static str,
        incoming: &'static str,
    },

    #[error("missing required config key '{0}'")]
    MissingKey(String),

    #[error("config key '{key}' has unexpected type (expected {expected})")]
    WrongType { key: String, expected: &'static str },
}

/// An ordered list of configuration layers, lowest precedence first
///
/// Layers are YAML files whose top-level document is a mapping. A later
/// layer overrides an earlier one key by key; nested mappings are merged
/// recursively so a local file can override a single leaf without restating
/// the whole structure.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    layers: Vec<PathBuf>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer with higher precedence than everything before it
    pub fn push_layer<P: Into<PathBuf>>(&mut self, path: P) {
        self.layers.push(path.into());
    }

    /// Builder-style variant of [`push_layer`](Self::push_layer)
    pub fn with_layer<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.push_layer(path);
        self
    }

    /// Locate the standard layers for the given base names
    ///
    /// For each name, in order, looks for `<name>.yaml` in the user config
    /// directory and then the working directory. Later names override
    /// earlier ones, so `discover(&["project", "local"])` gives the usual
    /// defaults-then-local-overrides stack. Files that do not exist are
    /// simply not added.
    pub fn discover(names: &[&str]) -> Self {
        let mut store = Self::new();

        for name in names {
            let file = format!("{}.yaml", name);
            if let Some(dir) = dirs::config_dir() {
                let candidate = dir.join(&file);
                if candidate.is_file() {
                    store.push_layer(candidate);
                }
            }
            let local = PathBuf::from(&file);
            if local.is_file() {
                store.push_layer(local);
            }
        }

        store
    }

    /// Paths of the layers in precedence order
    pub fn layers(&self) -> &[PathBuf] {
        &self.layers
    }

    /// Read every layer and merge them into one effective configuration
    ///
    /// Layers whose file is missing are skipped; everything else that goes
    /// wrong (unreadable file, parse failure, non-mapping document, a merge
    /// the policy cannot resolve) surfaces as a [`ConfigError`].
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut root = Value::Mapping(serde_yaml::Mapping::new());

        for path in &self.layers {
            if !path.exists() {
                tracing::debug!(path = %path.display(), "config layer not present, skipping");
                continue;
            }
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let layer: Value =
                serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            if !matches!(layer, Value::Mapping(_)) {
                return Err(ConfigError::NotAMapping { path: path.clone() });
            }
            tracing::debug!(path = %path.display(), "applying config layer");
            merge_value(&mut root, layer, &mut Vec::new())?;
        }

        Ok(Config { root })
    }
}

/// The effective configuration: one merged key-to-value tree
///
/// Immutable once built. Values are addressed with dotted paths
/// (`postgres.credentials.password`) that walk the nested mappings; the
/// runner itself treats every key opaquely.
#[derive(Debug, Clone)]
pub struct Config {
    root: Value,
}

impl Config {
    /// An empty configuration
    pub fn empty() -> Self {
        Self {
            root: Value::Mapping(serde_yaml::Mapping::new()),
        }
    }

    /// Parse a single in-memory YAML document as a configuration
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        if !matches!(root, Value::Mapping(_)) {
            return Err(ConfigError::NotAMapping {
                path: PathBuf::from("<inline>"),
            });
        }
        Ok(Self { root })
    }

    /// Look up a value by dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            match current {
                Value::Mapping(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Look up a string value by dotted path
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Look up an integer value by dotted path
    ///
    /// Returns `Ok(None)` when the key is absent and `WrongType` when it is
    /// present but not an unsigned integer.
    pub fn get_u64(&self, path: &str) -> Result<Option<u64>, ConfigError> {
        match self.get(path) {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or(ConfigError::WrongType {
                key: path.to_string(),
                expected: "unsigned integer",
            }),
        }
    }

    /// Look up a string value that must be present
    pub fn require_str(&self, path: &str) -> Result<&str, ConfigError> {
        match self.get(path) {
            None => Err(ConfigError::MissingKey(path.to_string())),
            Some(value) => value.as_str().ok_or(ConfigError::WrongType {
                key: path.to_string(),
                expected: "string",
            }),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Merge `overlay` into `base` under the override policy
///
/// Mapping into mapping merges key by key, recursively. Any other pair of
/// non-mapping values is replaced wholesale by the overlay. A mapping on one
/// side and a non-mapping on the other is an irreconcilable conflict and is
/// surfaced rather than coerced.
fn merge_value(
    base: &mut Value,
    overlay: Value,
    path: &mut Vec<String>,
) -> Result<(), ConfigError> {
    match (&mut *base, overlay) {
        (Value::Mapping(existing), Value::Mapping(incoming)) => {
            for (key, value) in incoming {
                let label = key
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{:?}", key));
                match existing.get_mut(&key) {
                    Some(slot) => {
                        path.push(label);
                        merge_value(slot, value, path)?;
                        path.pop();
                    }
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
            Ok(())
        }
        (Value::Mapping(_), incoming) => Err(ConfigError::MergeConflict {
            path: path.join("."),
            existing: "mapping",
            incoming: kind(&incoming),
        }),
        (existing, incoming @ Value::Mapping(_)) => Err(ConfigError::MergeConflict {
            path: path.join("."),
            existing: kind(existing),
            incoming: kind(&incoming),
        }),
        (slot, incoming) => {
            *slot = incoming;
            Ok(())
        }
    }
}
