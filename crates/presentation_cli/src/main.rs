//! Aftershock CLI
//!
//! Drives an exploration policy from the command line: events arrive as JSON
//! lines on stdin, decided actions leave as JSON lines on stdout.

#![allow(clippy::print_stdout)]

mod run;

use std::path::{Path, PathBuf};
use std::time::Duration;

use application::{AVAILABLE_POLICIES, ApplicationError, ParamSource, PolicyParams, keys};
use clap::{Parser, Subcommand};
use infrastructure::{ConfigParamSource, LogFormat, TelemetryConfig, init_tracing};
use tracing::warn;

/// Aftershock fault-injection explorer
#[derive(Parser)]
#[command(name = "aftershock")]
#[command(author, version, about = "Randomized fault-injection explorer", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a policy configuration file and print the resulting parameters
    CheckConfig {
        /// Path to the TOML configuration
        file: PathBuf,
    },

    /// Read events from stdin and print decided actions to stdout
    ///
    /// Each input line is one JSON event; each output line is one JSON action.
    /// Example: aftershock run --config policy.toml < events.jsonl
    Run {
        /// Path to the TOML configuration (environment only if omitted)
        #[arg(short, long, env = "AFTERSHOCK_CONFIG")]
        config: Option<PathBuf>,

        /// Policy name, overriding `explorePolicy` from the configuration
        #[arg(short, long)]
        policy: Option<String>,

        /// How long to keep emitting after stdin closes (e.g. "2s", "500ms")
        #[arg(long, default_value = "1s", value_parser = parse_linger)]
        linger: Duration,
    },

    /// List available policies
    Policies,
}

fn parse_linger(raw: &str) -> Result<Duration, ApplicationError> {
    application::parse_duration("linger", raw)
}

fn load_source(path: Option<&Path>) -> Result<ConfigParamSource, ApplicationError> {
    path.map_or_else(
        || ConfigParamSource::from_toml_str(""),
        ConfigParamSource::from_file,
    )
}

fn telemetry_config(
    cli: &Cli,
    source: Option<&ConfigParamSource>,
) -> Result<TelemetryConfig, ApplicationError> {
    let base = match source {
        Some(source) => source.telemetry()?,
        None => TelemetryConfig::default(),
    };
    let mut config = base.with_verbosity(cli.verbose);
    if cli.json_logs {
        config.format = LogFormat::Json;
    }
    Ok(config)
}

fn check_config(source: &ConfigParamSource) -> anyhow::Result<PolicyParams> {
    if source.is_set(keys::EXPLORE_POLICY) {
        let name = source.get_string(keys::EXPLORE_POLICY)?;
        if !AVAILABLE_POLICIES.contains(&name.as_str()) {
            warn!(policy = %name, available = ?AVAILABLE_POLICIES, "Unknown explore policy");
        }
    }
    Ok(PolicyParams::default().apply(source)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = match &cli.command {
        Commands::CheckConfig { file } => Some(ConfigParamSource::from_file(file)?),
        Commands::Run { config, .. } => Some(load_source(config.as_deref())?),
        Commands::Policies => None,
    };
    init_tracing(&telemetry_config(&cli, source.as_ref())?)?;

    match (cli.command, source) {
        (Commands::CheckConfig { file }, Some(source)) => {
            let params = check_config(&source)?;
            println!("✅ {} is valid", file.display());
            println!("{}", serde_json::to_string_pretty(&params)?);
        },
        (Commands::Run { policy, linger, .. }, Some(source)) => {
            run::run(&source, policy.as_deref(), linger).await?;
        },
        (Commands::Policies, _) => {
            for name in AVAILABLE_POLICIES {
                println!("{name}");
            }
        },
        (_, None) => anyhow::bail!("configuration was not loaded"),
    }

    Ok(())
}
