//! Argument synthesizer: config document + script name → derived paths and argv.
//!
//! Reserved keys each have one dedicated extraction below. Every other key goes
//! through the generic flag rule in [`flag_for`].

use crate::config::{ConfigDocument, ConfigValue};
use crate::constants::{DEFAULT_D, DEFAULT_K_FOLD_ID, DEFAULT_T};
use crate::error::{InvokeError, Result};
use std::path::{Path, PathBuf};

/// Keys consumed by path derivation or special flag handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedKey {
    D,
    T,
    RootDir,
    LogDir,
    KFoldId,
    Scratch,
}

impl ReservedKey {
    pub const ALL: [ReservedKey; 6] = [
        ReservedKey::D,
        ReservedKey::T,
        ReservedKey::RootDir,
        ReservedKey::LogDir,
        ReservedKey::KFoldId,
        ReservedKey::Scratch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReservedKey::D => "d",
            ReservedKey::T => "t",
            ReservedKey::RootDir => "root_dir",
            ReservedKey::LogDir => "log_dir",
            ReservedKey::KFoldId => "k-fold-id",
            ReservedKey::Scratch => "scratch",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == key)
    }
}

/// Paths computed from config fields, never supplied directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPaths {
    pub dynamic_log_path: PathBuf,
    pub dynamic_root_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub paths: DerivedPaths,
    pub args: Vec<String>,
}

/// Name used for log paths and registry files: `train.py` → `train`.
pub fn script_stem(script: &str) -> &str {
    Path::new(script)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(script)
}

/// Build derived paths and the ordered argument list.
///
/// Order: `--log <path>`, positional root path (if `root_dir` is set),
/// `--scratch` (if `scratch: true`), then remaining keys in document order.
pub fn synthesize(doc: &ConfigDocument, script_name: &str) -> Result<Synthesis> {
    let paths = derive_paths(doc, script_name);

    let mut args = vec!["--log".to_string(), path_text(&paths.dynamic_log_path)?];

    if doc.contains(ReservedKey::RootDir.name()) {
        args.push(path_text(&paths.dynamic_root_path)?);
    }

    if scratch(doc) {
        args.push("--scratch".to_string());
    }

    for (key, value) in doc.iter() {
        if ReservedKey::from_key(key).is_some() {
            continue;
        }
        args.push(flag_for(key));
        args.push(value.to_string());
    }

    tracing::debug!(script = script_name, argc = args.len(), "arguments synthesized");
    Ok(Synthesis { paths, args })
}

/// Pure function of `d`, `t`, `root_dir`, `log_dir`, `k-fold-id` and the script name.
pub fn derive_paths(doc: &ConfigDocument, script_name: &str) -> DerivedPaths {
    let d = text_or(doc, ReservedKey::D, DEFAULT_D);
    let t = text_or(doc, ReservedKey::T, DEFAULT_T);
    let root_dir = text_or(doc, ReservedKey::RootDir, "");
    let log_dir = text_or(doc, ReservedKey::LogDir, "");
    let fold = format!("k-fold-{}", text_or(doc, ReservedKey::KFoldId, DEFAULT_K_FOLD_ID));

    let dynamic_log_path = Path::new(&log_dir)
        .join(format!("{d}_2_{t}"))
        .join(script_name)
        .join(&fold);
    let dynamic_root_path = Path::new(&root_dir).join(&fold);

    DerivedPaths {
        dynamic_log_path,
        dynamic_root_path,
    }
}

fn text_or(doc: &ConfigDocument, key: ReservedKey, default: &str) -> String {
    doc.get(key.name())
        .map(ToString::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn scratch(doc: &ConfigDocument) -> bool {
    doc.get(ReservedKey::Scratch.name())
        .and_then(ConfigValue::as_bool)
        .unwrap_or(false)
}

/// `-k` for single-character keys, `--key` otherwise (an empty key gives `--`).
fn flag_for(key: &str) -> String {
    if key.chars().count() == 1 {
        format!("-{key}")
    } else {
        format!("--{key}")
    }
}

fn path_text(p: &Path) -> Result<String> {
    p.to_str()
        .map(str::to_string)
        .ok_or_else(|| InvokeError::Synthesis(format!("path is not valid UTF-8: {}", p.display())))
}
