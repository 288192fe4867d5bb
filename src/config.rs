//! Config loader: a flat YAML mapping of scalars, kept in document order.

use crate::constants::CONFIG_EXTENSIONS;
use crate::error::{InvokeError, IoContext, Result};
use serde_yaml::{Number, Value};
use std::fmt;
use std::path::Path;

/// One scalar from the config document.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Str(String),
    Number(Number),
    Bool(bool),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Literal textual form, as handed to the launched process.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Str(s) => f.write_str(s),
            ConfigValue::Number(n) => write!(f, "{n}"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Ordered key/value pairs. Keys are case-sensitive and unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigDocument {
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load a config file.
///
/// Checks run in a fixed order: existence, then extension, then parse.
/// A missing `.txt` file is therefore reported as not found.
pub fn load(path: &Path) -> Result<ConfigDocument> {
    if !path.is_file() {
        return Err(InvokeError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| CONFIG_EXTENSIONS.contains(&e))
        .unwrap_or(false);
    if !ext_ok {
        return Err(InvokeError::ConfigExtensionInvalid {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path)
        .io_context(|| format!("read config {}", path.display()))?;
    let doc = parse_str(&text).map_err(|reason| InvokeError::ConfigParse {
        path: path.to_path_buf(),
        reason,
    })?;

    tracing::debug!(path = %path.display(), keys = doc.len(), "config loaded");
    Ok(doc)
}

/// Parse YAML text into a document; the error is a human-readable reason.
pub fn parse_str(text: &str) -> std::result::Result<ConfigDocument, String> {
    let root: Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;

    let mapping = match root {
        // empty file
        Value::Null => return Ok(ConfigDocument::default()),
        Value::Mapping(m) => m,
        other => return Err(format!("top level must be a mapping, found {}", kind(&other))),
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (k, v) in mapping {
        let key = match k {
            Value::String(s) => s,
            other => return Err(format!("keys must be strings, found {}", kind(&other))),
        };
        let value = match v {
            Value::String(s) => ConfigValue::Str(s),
            Value::Number(n) => ConfigValue::Number(n),
            Value::Bool(b) => ConfigValue::Bool(b),
            other => {
                return Err(format!(
                    "key '{key}' must hold a string, number or boolean, found {}",
                    kind(&other)
                ))
            }
        };
        entries.push((key, value));
    }

    Ok(ConfigDocument { entries })
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
