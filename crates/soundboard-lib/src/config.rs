//! Host configuration loading.
//!
//! The assistant keeps its settings in JSON files, system-wide first and then
//! per user. Both are optional. Lines starting with `//` are comments.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use soundboard_core::config::{merge_layers, platform};

/// System-wide host configuration.
pub const SYSTEM_CONFIG: &str = "/etc/mycroft/mycroft.conf";

/// Per-user host configuration, relative to the home directory.
pub const USER_CONFIG: &str = ".mycroft/mycroft.conf";

/// System then user config paths, lowest precedence first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(USER_CONFIG));
    }
    paths
}

fn strip_comments(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read one config layer. Missing files and unparseable JSON yield `None`.
pub fn load_layer(path: &Path) -> Option<Value> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("config: skipping {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&strip_comments(&raw)) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("config: ignoring {}: {e}", path.display());
            None
        }
    }
}

/// Merge every readable layer in `paths`, later files winning.
pub fn load_host_config(paths: &[PathBuf]) -> Value {
    merge_layers(paths.iter().filter_map(|path| load_layer(path)))
}

/// Platform class named by the merged config, `"unknown"` if unset.
pub fn detect_platform(paths: &[PathBuf]) -> String {
    platform(&load_host_config(paths))
}
