//! Locus CLI - location aware application launcher
//!
//! Evaluates the user's profile: starts each listed program unless it is
//! already running, optionally only at certain network locations.

mod logging;
mod output;
mod profile_loader;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use locus_core::application::{
    BackgroundChanger, Capabilities, ConnectivityWaiter, Launcher, LocationResolver, ProfileRunner,
};
use locus_core::domain::{NetworkSettings, Profile};
use locus_core::port::ProcessRunner;
use locus_infra_system::{FsImageCatalog, PathLocator, SubprocessRunner, SysinfoProcessTable};

use logging::LogFormat;
use profile_loader::{expand_path, load_profile, DEFAULT_PROFILE};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "locus")]
#[command(about = "Location aware application launcher", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Profile to evaluate
    #[arg(short = 'c', long = "config", env = "LOCUS_PROFILE", default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    /// Console log format
    #[arg(long, env = "LOCUS_LOG_FORMAT", value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Also write JSON logs to this file
    #[arg(long, env = "LOCUS_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the profile (default)
    Run {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start a single program unless it's already running
    Launch {
        /// Shell command that starts the program
        command: String,

        /// Shell command that succeeds when the program is running
        #[arg(long)]
        is_running: Option<String>,
    },

    /// Print the current location from the profile's known networks
    Where,

    /// Print the current gateway IP and MAC address
    Gateway,

    /// Check internet connectivity
    Online {
        /// Block until connected
        #[arg(long)]
        wait: bool,
    },

    /// Set a random background using the profile's background rule
    Background,
}

/// Wire the adapters into the capability set
fn build_capabilities(settings: &NetworkSettings) -> Capabilities {
    let runner: Arc<dyn ProcessRunner> = Arc::new(SubprocessRunner::new());
    Capabilities {
        launcher: Arc::new(Launcher::new(
            runner.clone(),
            Arc::new(SysinfoProcessTable::new()),
            Arc::new(PathLocator::from_env()),
        )),
        location: Arc::new(LocationResolver::new(runner.clone())),
        connectivity: Arc::new(ConnectivityWaiter::with_settings(runner.clone(), settings)),
        background: Arc::new(BackgroundChanger::new(runner, Arc::new(FsImageCatalog::new()))),
    }
}

fn load(cli: &Cli) -> Result<Profile> {
    load_profile(&expand_path(&cli.profile))
}

/// Profile when available; commands that only need defaults tolerate a missing file
fn load_or_default(cli: &Cli) -> Result<Profile> {
    let path = expand_path(&cli.profile);
    if path.exists() {
        load_profile(&path)
    } else {
        Ok(Profile::default())
    }
}

async fn execute(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        None | Some(Commands::Run { json: false }) => {
            let profile = load(&cli)?;
            let caps = build_capabilities(&profile.network);
            let report = ProfileRunner::new(caps).run(&profile).await?;
            output::print_report(&report);
            Ok(exit_code(report.all_ok()))
        }

        Some(Commands::Run { json: true }) => {
            let profile = load(&cli)?;
            let caps = build_capabilities(&profile.network);
            let report = ProfileRunner::new(caps).run(&profile).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(exit_code(report.all_ok()))
        }

        Some(Commands::Launch {
            ref command,
            ref is_running,
        }) => {
            let caps = build_capabilities(&NetworkSettings::default());
            let status = caps.launcher.launch(command, is_running.as_deref()).await;
            output::print_status(command, status);
            Ok(exit_code(status.is_running()))
        }

        Some(Commands::Where) => {
            let profile = load(&cli)?;
            let caps = build_capabilities(&profile.network);
            match caps.location.resolve_location(&profile.locations).await {
                Some(location) => {
                    println!("{}", location.green().bold());
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("{}", "unknown".yellow());
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Some(Commands::Gateway) => {
            let caps = build_capabilities(&NetworkSettings::default());
            match caps.location.discover_gateway().await {
                Some(gateway) => {
                    println!("{} {}", "IP: ".bold(), gateway.ip);
                    println!("{} {}", "MAC:".bold(), gateway.mac);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("{}", "No gateway found (offline?)".yellow());
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Some(Commands::Online { wait }) => {
            let profile = load_or_default(&cli)?;
            let caps = build_capabilities(&profile.network);
            if wait {
                caps.connectivity.wait_for_connection().await;
            }
            let online = caps.connectivity.is_connected().await;
            if online {
                println!("{}", "online".green().bold());
            } else {
                println!("{}", "offline".red().bold());
            }
            Ok(exit_code(online))
        }

        Some(Commands::Background) => {
            let profile = load(&cli)?;
            let rule = profile
                .background
                .as_ref()
                .context("Profile has no [background] section")?;
            let caps = build_capabilities(&profile.network);
            let image = caps.background.apply(rule).await?;
            println!("{} {}", "✓".green(), image.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 1. Initialize logging
    let _log_guard = match logging::init(
        cli.verbose,
        cli.quiet,
        cli.log_format,
        cli.log_file.as_deref(),
    ) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    info!("Initializing locus v{}", VERSION);

    // 2. Execute the requested action
    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Fatal error, terminating");
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
