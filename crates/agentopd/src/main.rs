//! agentopd — the agentop configuration daemon.
//!
//! Builds the operator configuration from a settings file, detects
//! environment capabilities through a file-backed probe, and keeps
//! detecting until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! agentopd run --settings /etc/agentop/agentop.toml --capabilities /run/agentop/capabilities.toml
//! agentopd detect --capabilities /run/agentop/capabilities.toml
//! agentopd init-settings > agentop.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use agentop_config::{Config, ConfigBuilder};
use agentop_core::{OperatorSettings, parse_duration};

mod file_probe;

use file_probe::FileProbe;

#[derive(Parser)]
#[command(name = "agentopd", about = "agentop configuration daemon", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect capabilities now and keep detecting until interrupted.
    Run {
        /// Operator settings file (agentop.toml).
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Capabilities file read by the probe on every pass.
        #[arg(long)]
        capabilities: PathBuf,

        /// Override the detection interval, e.g. "5s" or "500ms".
        #[arg(long)]
        interval: Option<String>,

        /// Exit if the first detection pass fails.
        #[arg(long)]
        fail_fast: bool,
    },
    /// Run a single detection pass and print the detected state as JSON.
    Detect {
        /// Operator settings file (agentop.toml).
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Capabilities file read by the probe.
        #[arg(long)]
        capabilities: PathBuf,
    },
    /// Print a settings file with the default options.
    InitSettings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    match cli.command {
        Command::Run {
            settings,
            capabilities,
            interval,
            fail_fast,
        } => run(settings, capabilities, interval, fail_fast).await,
        Command::Detect {
            settings,
            capabilities,
        } => detect(settings, capabilities).await,
        Command::InitSettings => {
            print!("{}", OperatorSettings::scaffold().to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,agentopd=debug,agentop=debug"))?;

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn build_config(settings: Option<PathBuf>, capabilities: PathBuf) -> anyhow::Result<ConfigBuilder> {
    let settings = match settings {
        Some(path) => OperatorSettings::from_file(&path)
            .with_context(|| format!("reading settings {}", path.display()))?,
        None => OperatorSettings::default(),
    };

    let probe = FileProbe::new(capabilities);
    info!(capabilities = %probe.path().display(), "using file capability probe");

    Ok(ConfigBuilder::new()
        .with_probe(Arc::new(probe))
        .with_settings(&settings)?)
}

async fn run(
    settings: Option<PathBuf>,
    capabilities: PathBuf,
    interval: Option<String>,
    fail_fast: bool,
) -> anyhow::Result<()> {
    info!("agentop daemon starting");

    let mut builder = build_config(settings, capabilities)?;
    if let Some(raw) = interval {
        let interval = parse_duration(&raw)
            .with_context(|| format!("invalid --interval {raw:?}"))?;
        builder = builder.with_auto_detect_frequency(interval);
    }
    let config = builder.build()?;
    register_change_logger(&config);

    let (handle, first_pass) = config.start_auto_detect().await;
    if let Err(e) = first_pass {
        if fail_fast {
            handle.shutdown().await;
            return Err(e).context("initial auto-detection failed");
        }
        error!(error = %e, "initial auto-detection failed; retrying in the background");
    }

    let detected = config.detected();
    info!(
        routes = %detected.routes,
        autoscaling_version = %detected.autoscaling_version,
        interval_ms = config.auto_detect_frequency().as_millis() as u64,
        "auto-detection running"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to install CTRL+C handler")?;
    info!("shutdown signal received");

    handle.shutdown().await;
    info!("agentop daemon stopped");
    Ok(())
}

fn register_change_logger(config: &Config) {
    let observed = config.clone();
    config.register_routes_change_callback(move || {
        info!(routes = %observed.routes(), "openshift routes availability changed");
        Ok(())
    });
}

async fn detect(settings: Option<PathBuf>, capabilities: PathBuf) -> anyhow::Result<()> {
    let config = build_config(settings, capabilities)?.build()?;
    config.auto_detect().await?;
    println!("{}", serde_json::to_string_pretty(&config.detected())?);
    Ok(())
}
