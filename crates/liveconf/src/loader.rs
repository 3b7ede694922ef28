//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, LiveConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/liveosc/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("liveosc/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("liveosc.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file into a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    contents
        .parse::<toml::Table>()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Merge `overlay` into `base`, key by key. Nested tables merge recursively;
/// any other value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Deserialize a merged table; missing keys fall back to defaults.
pub fn from_table(table: toml::Table, origin: &Path) -> Result<LiveConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into::<LiveConfig>()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut LiveConfig, sources: &mut ConfigSources) {
    apply_overrides_with(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup (the environment, in production).
pub fn apply_overrides_with<F>(config: &mut LiveConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("LIVEOSC_HOST") {
        config.peer.host = v;
        sources.env_overrides.push("LIVEOSC_HOST".to_string());
    }
    if let Some(port) = lookup("LIVEOSC_SEND_PORT").and_then(|v| v.parse().ok()) {
        config.peer.send_port = port;
        sources.env_overrides.push("LIVEOSC_SEND_PORT".to_string());
    }
    if let Some(v) = lookup("LIVEOSC_LISTEN_HOST") {
        config.peer.listen_host = v;
        sources.env_overrides.push("LIVEOSC_LISTEN_HOST".to_string());
    }
    if let Some(port) = lookup("LIVEOSC_LISTEN_PORT").and_then(|v| v.parse().ok()) {
        config.peer.listen_port = port;
        sources.env_overrides.push("LIVEOSC_LISTEN_PORT".to_string());
    }
    if let Some(ms) = lookup("LIVEOSC_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        config.client.timeout_ms = ms;
        sources.env_overrides.push("LIVEOSC_TIMEOUT_MS".to_string());
    }

    if let Some(v) = lookup("LIVEOSC_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("LIVEOSC_LOG_LEVEL".to_string());
    }
    // RUST_LOG wins over everything
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}
