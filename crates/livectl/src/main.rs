//! livectl - command-line control of Ableton Live over AbletonOSC
//!
//! Subcommands:
//! - `livectl test` - Check that AbletonOSC answers
//! - `livectl version` - Print Live and AbletonOSC versions
//! - `livectl send <address> [args]` - Send a one-way message
//! - `livectl query <address> [args]` - Send a message and print the reply
//! - `livectl track <index>` - Print a track's mixer state as JSON
//! - `livectl config` - Print the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use liveconf::LiveConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "livectl")]
#[command(about = "Control Ableton Live over AbletonOSC")]
#[command(version)]
struct Cli {
    /// Config file (takes the place of ./liveosc.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Host running Live
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port AbletonOSC receives on
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that AbletonOSC answers /live/test
    Test {
        /// Timeout in milliseconds
        #[arg(short, long, default_value = "1000")]
        timeout: u64,
    },

    /// Print Live and AbletonOSC API versions
    Version,

    /// Send a one-way message
    Send {
        /// OSC address, e.g. /live/song/start_playing
        address: String,

        /// Arguments: integers, floats, true/false, anything else is a string
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },

    /// Send a message and print the reply on the same address
    Query {
        /// OSC address, e.g. /live/song/get/tempo
        address: String,

        /// Arguments: integers, floats, true/false, anything else is a string
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,

        /// Timeout in milliseconds (defaults to the configured timeout)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Print a track's mixer state and devices as JSON
    Track {
        /// Zero-based track index
        index: i32,
    },

    /// Print the effective configuration and where it came from
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = LiveConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.peer.host = host;
    }
    if let Some(port) = cli.port {
        config.peer.send_port = port;
    }

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.telemetry.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Test { timeout } => {
            commands::test(&config, timeout).await?;
        }
        Commands::Version => {
            commands::version(&config).await?;
        }
        Commands::Send { address, args } => {
            commands::send(&config, &address, &args).await?;
        }
        Commands::Query {
            address,
            args,
            timeout,
        } => {
            commands::query(&config, &address, &args, timeout).await?;
        }
        Commands::Track { index } => {
            commands::track(&config, index).await?;
        }
        Commands::Config => {
            commands::show_config(&config, &sources);
        }
    }

    Ok(())
}
