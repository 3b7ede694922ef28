//! CLI command implementations

use std::time::Duration;

use anyhow::{bail, Context, Result};
use liveconf::{ConfigSources, LiveConfig};
use liveproto::{ClientConfig, OscArg, OscClient};
use liveset::{Availability, LiveSet};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Read a command-line argument as the narrowest OSC type it fits.
///
/// Integers first, then finite floats, then `true`/`false`; anything else
/// is sent as a string.
pub fn parse_arg(raw: &str) -> OscArg {
    if let Ok(v) = raw.parse::<i32>() {
        return OscArg::Int(v);
    }
    if let Ok(v) = raw.parse::<f32>() {
        // "inf" and "nan" parse as floats but are meant as text
        if v.is_finite() {
            return OscArg::Float(v);
        }
    }
    match raw {
        "true" => OscArg::Bool(true),
        "false" => OscArg::Bool(false),
        _ => OscArg::String(raw.to_string()),
    }
}

fn parse_args(raw: &[String]) -> Vec<OscArg> {
    raw.iter().map(|a| parse_arg(a)).collect()
}

/// JSON rendering of a reply value
pub fn arg_to_json(arg: &OscArg) -> Value {
    match arg {
        OscArg::Int(v) => json!(v),
        OscArg::Long(v) => json!(v),
        OscArg::Float(v) => json!(v),
        OscArg::Double(v) => json!(v),
        OscArg::String(s) => json!(s),
        OscArg::Blob(b) => json!({ "blob_bytes": b.len() }),
        OscArg::Bool(b) => json!(b),
        OscArg::Nil => Value::Null,
    }
}

async fn connect(config: &LiveConfig) -> Result<LiveSet> {
    let client_config =
        ClientConfig::from_config("livectl", config).context("Invalid peer configuration")?;
    let listen = client_config.listen;
    let peer = client_config.peer;
    let client = OscClient::open(client_config)
        .await
        .with_context(|| format!("Failed to bind {} (is another client running?)", listen))?;
    debug!("Connected to {} via {}", peer, client.local_addr());
    Ok(LiveSet::new(client))
}

/// Probe /live/test and report latency
pub async fn test(config: &LiveConfig, timeout_ms: u64) -> Result<()> {
    let live = connect(config).await?;
    let availability = live.probe(Duration::from_millis(timeout_ms)).await;
    let peer = live.client().peer();
    live.close().await;
    info!("Connection test of {}: {}", peer, availability);

    match availability {
        Availability::Available { latency } => {
            println!("AbletonOSC at {} answered in {:?}", peer, latency);
            Ok(())
        }
        Availability::Unavailable { reason } => {
            bail!(
                "No answer from AbletonOSC at {}: {}\n\n\
                 Is Live running with AbletonOSC selected as a control surface?",
                peer,
                reason
            );
        }
    }
}

/// Print Live and AbletonOSC API versions
pub async fn version(config: &LiveConfig) -> Result<()> {
    let live = connect(config).await?;
    let result = async {
        let live_version = live.application.get_version().await?;
        let api_version = live.application.get_api_version().await?;
        Ok::<_, liveset::LiveError>((live_version, api_version))
    }
    .await;
    live.close().await;

    let (live_version, api_version) = result.context("Failed to read versions")?;
    println!("Live {} (AbletonOSC API {})", live_version, api_version);
    Ok(())
}

/// Send a one-way message
pub async fn send(config: &LiveConfig, address: &str, raw_args: &[String]) -> Result<()> {
    let args = parse_args(raw_args);
    let live = connect(config).await?;
    debug!("Sending {} with {} args", address, args.len());
    let result = live.client().command(address, &args).await;
    live.close().await;

    result.with_context(|| format!("Failed to send {}", address))?;
    Ok(())
}

/// Send a message, wait for the reply, print it as JSON
pub async fn query(
    config: &LiveConfig,
    address: &str,
    raw_args: &[String],
    timeout_ms: Option<u64>,
) -> Result<()> {
    let args = parse_args(raw_args);
    let live = connect(config).await?;
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| live.client().default_timeout());

    debug!("Querying {} (timeout {:?})", address, timeout);
    let result = live
        .client()
        .query_with_timeout(address, &args, timeout)
        .await;
    live.close().await;

    let reply = result.with_context(|| format!("Query {} failed", address))?;
    let output = json!({
        "address": address,
        "args": reply.iter().map(arg_to_json).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print one track's state as JSON
pub async fn track(config: &LiveConfig, index: i32) -> Result<()> {
    let live = connect(config).await?;
    let result = live.track.snapshot(index).await;
    live.close().await;

    let info = result.with_context(|| format!("Failed to read track {}", index))?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

/// Print the effective configuration and its sources
pub fn show_config(config: &LiveConfig, sources: &ConfigSources) {
    if sources.files.is_empty() {
        println!("# No config files found, using defaults");
    } else {
        for path in &sources.files {
            println!("# Loaded {}", path.display());
        }
    }
    for var in &sources.env_overrides {
        println!("# Overridden by ${}", var);
    }
    println!();
    print!("{}", config.to_toml());
}
