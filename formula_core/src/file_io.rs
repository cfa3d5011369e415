//! # File I/O Module
//!
//! Loads and saves the default-values file with safety features:
//! - **Atomic saves**: Write to `.tmp`, sync, rename to prevent corruption
//! - **File locking**: Serialize concurrent writers via a `.lock` sibling
//! - **Version validation**: Reject files written by an incompatible schema
//!
//! ## File Format
//!
//! JSON by default; YAML when the path ends in `.yaml` or `.yml`. Saved files
//! use a versioned envelope:
//!
//! ```json
//! { "version": "0.1.0", "modified": "2024-05-01T12:00:00Z", "values": { "g0": "9.80665" } }
//! ```
//!
//! Loading also accepts a bare `name: value` mapping, the format older tools
//! wrote, with numbers and booleans converted to text.
//!
//! ## Example
//!
//! ```rust,no_run
//! use formula_core::defaults::DefaultValues;
//! use formula_core::file_io::{load_defaults, save_defaults};
//! use std::path::Path;
//!
//! let path = Path::new("defaults.yaml");
//! let mut defaults = load_defaults(path)?;
//! defaults.set("g0", "9.80665");
//! save_defaults(&defaults, path)?;
//! # Ok::<(), formula_core::errors::FormulaError>(())
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::DefaultValues;
use crate::errors::{FormulaError, FormulaResult};

/// Current defaults file schema version
pub const DEFAULTS_SCHEMA_VERSION: &str = "0.1.0";

// ============================================================================
// Format
// ============================================================================

/// On-disk encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsFormat {
    Json,
    Yaml,
}

impl DefaultsFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DefaultsFormat::Yaml
            }
            _ => DefaultsFormat::Json,
        }
    }
}

/// Versioned envelope written by [`save_defaults`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsDocument {
    pub version: String,
    pub modified: DateTime<Utc>,
    pub values: DefaultValues,
}

impl DefaultsDocument {
    pub fn new(values: DefaultValues) -> Self {
        DefaultsDocument {
            version: DEFAULTS_SCHEMA_VERSION.to_string(),
            modified: Utc::now(),
            values,
        }
    }
}

// ============================================================================
// Locking
// ============================================================================

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        LockInfo {
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Exclusive advisory lock on a file, released (and the lock file removed)
/// on drop.
pub struct FileLock {
    lock_path: PathBuf,
    /// Holds the OS lock
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path` without blocking.
    ///
    /// Fails with `FileLocked` if another handle holds it.
    pub fn acquire(path: &Path) -> FormulaResult<Self> {
        let lock_path = sibling_path(path, "lock");

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| FormulaError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| FormulaError::FileLocked {
            path: path.display().to_string(),
        })?;

        let info = LockInfo::current();
        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| FormulaError::SerializationError {
            reason: e.to_string(),
        })?;

        lock_file
            .set_len(0)
            .and_then(|_| lock_file.write_all(lock_json.as_bytes()))
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| FormulaError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(FileLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `path` with `.suffix` appended to its file name (`a.json` -> `a.json.lock`).
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}", suffix));
    path.with_file_name(name)
}

// ============================================================================
// Save / Load
// ============================================================================

/// Save the defaults with atomic write semantics.
///
/// The save process:
/// 1. Acquire the `.lock` sibling
/// 2. Serialize the envelope (JSON or YAML by extension)
/// 3. Write to a temporary file (`.tmp`) and fsync
/// 4. Rename `.tmp` over the target
pub fn save_defaults(defaults: &DefaultValues, path: &Path) -> FormulaResult<()> {
    let _lock = FileLock::acquire(path)?;

    let document = DefaultsDocument::new(defaults.clone());
    let text = match DefaultsFormat::from_path(path) {
        DefaultsFormat::Json => serde_json::to_string_pretty(&document).map_err(|e| e.to_string()),
        DefaultsFormat::Yaml => serde_yaml::to_string(&document).map_err(|e| e.to_string()),
    }
    .map_err(|reason| FormulaError::SerializationError { reason })?;

    let tmp_path = sibling_path(path, "tmp");

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| FormulaError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(text.as_bytes())
        .map_err(|e| FormulaError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| FormulaError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        FormulaError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load defaults from `path`.
///
/// A missing or empty file yields an empty store.
///
/// # Errors
///
/// - `VersionMismatch` if the envelope version is incompatible
/// - `SerializationError` for malformed content or non-scalar values
/// - `FileError` for other I/O failures
pub fn load_defaults(path: &Path) -> FormulaResult<DefaultValues> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DefaultValues::new()),
        Err(e) => return Err(FormulaError::file_error("open", path.display().to_string(), e.to_string())),
    };

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| FormulaError::file_error("read", path.display().to_string(), e.to_string()))?;

    parse_defaults(&contents, DefaultsFormat::from_path(path))
        .map_err(|e| match e {
            FormulaError::SerializationError { reason } => FormulaError::SerializationError {
                reason: format!("Invalid defaults file {}: {}", path.display(), reason),
            },
            other => other,
        })
}

/// Parse defaults text in either the envelope or the bare-mapping layout.
pub fn parse_defaults(contents: &str, format: DefaultsFormat) -> FormulaResult<DefaultValues> {
    if contents.trim().is_empty() {
        return Ok(DefaultValues::new());
    }

    let document: Value = match format {
        DefaultsFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        DefaultsFormat::Yaml => serde_yaml::from_str::<serde_yaml::Value>(contents)
            .map_err(|e| e.to_string())
            .and_then(|yaml| {
                if let Some(name) = non_finite_entry(&yaml) {
                    return Err(format!("value for '{}' must be a finite number", name));
                }
                serde_json::to_value(yaml).map_err(|e| e.to_string())
            }),
    }
    .map_err(|reason| FormulaError::SerializationError { reason })?;

    let mapping = match document {
        Value::Null => return Ok(DefaultValues::new()),
        Value::Object(mapping) => mapping,
        other => {
            return Err(FormulaError::SerializationError {
                reason: format!("expected a mapping of variable names, found {}", kind_of(&other)),
            })
        }
    };

    let is_envelope = matches!(mapping.get("version"), Some(Value::String(_)))
        && matches!(mapping.get("values"), Some(Value::Object(_)));

    let values = if is_envelope {
        if let Some(Value::String(version)) = mapping.get("version") {
            validate_version(version)?;
        }
        match mapping.get("values") {
            Some(Value::Object(values)) => values.clone(),
            _ => serde_json::Map::new(),
        }
    } else {
        mapping
    };

    let mut store = BTreeMap::new();
    for (name, value) in values {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            other => {
                return Err(FormulaError::SerializationError {
                    reason: format!("value for '{}' must be a scalar, found {}", name, kind_of(&other)),
                })
            }
        };
        store.insert(name, text);
    }
    Ok(DefaultValues::from_map(store))
}

/// Key of the first `.inf`/`.nan` entry in a YAML mapping, searched depth-first.
fn non_finite_entry(yaml: &serde_yaml::Value) -> Option<String> {
    let serde_yaml::Value::Mapping(mapping) = yaml else {
        return None;
    };
    mapping.iter().find_map(|(key, value)| match value {
        serde_yaml::Value::Number(n) if n.as_f64().is_some_and(|f| !f.is_finite()) => {
            Some(key.as_str().map_or_else(|| format!("{:?}", key), str::to_string))
        }
        serde_yaml::Value::Mapping(_) => non_finite_entry(value),
        _ => None,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Validate that a file version is compatible with the current schema.
pub fn validate_version(file_version: &str) -> FormulaResult<()> {
    let mismatch = || FormulaError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: DEFAULTS_SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .map(|p| p.trim().parse())
        .collect::<Result<_, _>>()
        .map_err(|_| mismatch())?;
    let current_parts: Vec<u32> = DEFAULTS_SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    match (file_parts.first(), current_parts.first()) {
        (Some(file_major), Some(current_major)) if file_major == current_major => {}
        _ => return Err(mismatch()),
    }

    // 0.x: a newer minor may contain breaking changes
    if current_parts.first() == Some(&0) {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}
