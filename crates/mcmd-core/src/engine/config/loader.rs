use super::raw::RawConfig;
use super::{ConfigError, SimulationConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const LINE_COMMENT: &str = "//";

/// Removes `//` comments from JSON text.
///
/// Lines whose first non-blank characters are `//` are dropped. Elsewhere everything
/// from `//` to the end of the line is removed, unless the `//` sits inside a string
/// literal.
pub fn strip_line_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.trim_start().starts_with(LINE_COMMENT) {
            continue;
        }
        out.push_str(strip_trailing_comment(line));
        out.push('\n');
    }
    out
}

fn strip_trailing_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
        } else if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            return line[..i].trim_end();
        }
        i += 1;
    }
    line
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

/// Parses JSON text (with `//` comments) into the raw, unvalidated configuration.
pub fn parse_json(text: &str) -> Result<RawConfig, ConfigError> {
    let cleaned = strip_line_comments(text);
    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(|e| ConfigError::Syntax(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| ConfigError::Type(e.to_string()))
}

/// Parses TOML text into the raw, unvalidated configuration.
pub fn parse_toml(text: &str) -> Result<RawConfig, ConfigError> {
    let table: toml::Table = toml::from_str(text).map_err(|e| ConfigError::Syntax(e.to_string()))?;
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Type(e.to_string()))
}

/// Reads a configuration file without validating it.
pub fn load_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })?;
    debug!("Parsing configuration from {}", path.display());
    if is_toml(path) {
        parse_toml(&text)
    } else {
        parse_json(&text)
    }
}

/// The directory relative paths in a configuration file are resolved against.
pub fn base_dir_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Loads and validates a configuration file, resolving relative paths against its directory.
pub fn load_simulation_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let raw = load_raw(path)?;
    SimulationConfig::from_raw(raw, base_dir_of(path))
}
