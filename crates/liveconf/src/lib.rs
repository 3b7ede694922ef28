//! Minimal configuration loading for the Live OSC client.
//!
//! This crate provides configuration loading with minimal dependencies,
//! so the transport, the façades and the CLI can all share it.
//!
//! # Configuration Sections
//!
//! - **Peer** (`PeerConfig`): where AbletonOSC listens and where we bind
//!   for its replies.
//! - **Client** (`ClientDefaults`): the library-wide query timeout and the
//!   largest datagram the listener accepts.
//! - **Telemetry** (`TelemetryConfig`): the log filter.
//!
//! # Usage
//!
//! ```rust,no_run
//! use liveconf::LiveConfig;
//!
//! let config = LiveConfig::load().expect("Failed to load config");
//! println!("Peer: {}", config.peer.send_addr());
//! println!("Timeout: {}ms", config.client.timeout_ms);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/liveosc/config.toml` (system)
//! 2. `~/.config/liveosc/config.toml` (user)
//! 3. `./liveosc.toml` (local override, or an explicit path)
//! 4. Environment variables (`LIVEOSC_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [peer]
//! host = "127.0.0.1"
//! send_port = 11000
//! listen_host = "0.0.0.0"
//! listen_port = 11001
//!
//! [client]
//! timeout_ms = 2000
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod client;
pub mod infra;
pub mod loader;

pub use client::ClientDefaults;
pub use infra::{PeerConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LiveConfig {
    #[serde(default)]
    pub peer: PeerConfig,

    #[serde(default)]
    pub client: ClientDefaults,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl LiveConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/liveosc/config.toml`
    /// 3. `~/.config/liveosc/config.toml`
    /// 4. `./liveosc.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./liveosc.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let origin = sources
            .files
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<defaults>"));
        let mut config = loader::from_table(merged, &origin)?;

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# Live OSC client configuration\n\n");

        output.push_str("[peer]\n");
        output.push_str(&format!("host = \"{}\"\n", self.peer.host));
        output.push_str(&format!("send_port = {}\n", self.peer.send_port));
        output.push_str(&format!("listen_host = \"{}\"\n", self.peer.listen_host));
        output.push_str(&format!("listen_port = {}\n", self.peer.listen_port));

        output.push_str("\n[client]\n");
        output.push_str(&format!("timeout_ms = {}\n", self.client.timeout_ms));
        output.push_str(&format!("max_datagram = {}\n", self.client.max_datagram));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}
