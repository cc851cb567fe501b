//! `dnshield` — on-device DNS filtering and HTTPS interception.
//!
//! Exit codes: 0 success, 1 unrecoverable startup error, 2 config
//! validation failure (§6).

mod bootstrap;
mod commands;
mod di;
mod network_state;
mod paths;
mod server;

use clap::{Parser, Subcommand};
use dnshield_domain::config::CliOverrides;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dnshield")]
#[command(version)]
#[command(about = "On-device DNS filtering and HTTPS interception")]
struct Cli {
    /// Path to config.toml. Defaults to $HOME/.dnshield/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the DNS/TLS listeners, admin API, and background jobs in the foreground.
    Run {
        /// Point active interfaces' DNS at dnshield on startup.
        #[arg(long)]
        auto_configure_dns: bool,
    },
    /// Generate (or load) the root CA and install it into the system trust store.
    InstallCa,
    /// Remove the CA from the system trust store.
    Uninstall {
        /// Also restore DNS settings and delete all dnshield state.
        #[arg(long)]
        all: bool,
    },
    /// Report whether the dnshield daemon appears to be running.
    Status,
    /// Manually apply or revert DNS redirection without starting the daemon.
    ConfigureDns {
        #[arg(long)]
        restore: bool,
        #[arg(long)]
        force: bool,
    },
    /// Manage admin API bearer tokens.
    Apikey {
        #[command(subcommand)]
        command: ApikeyCommand,
    },
}

#[derive(Subcommand)]
enum ApikeyCommand {
    /// Issue a new API key. Prints the bearer token once.
    Generate {
        #[arg(long)]
        label: String,
        /// viewer, operator, or admin.
        #[arg(long, default_value = "viewer")]
        role: String,
    },
    /// List every issued key (revoked ones included, marked as such).
    List,
    /// Revoke a key by id.
    Revoke {
        id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(paths::default_config_path);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(cli.command, config_path))
}

async fn run(command: Command, config_path: PathBuf) -> ExitCode {
    let mut config = match bootstrap::load_config(&config_path, CliOverrides::default()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::from(2);
        }
    };
    paths::apply_state_dir_defaults(&mut config);
    bootstrap::init_logging(&config);

    let result = match command {
        Command::Run { auto_configure_dns } => commands::run::execute(config, &config_path, commands::run::RunArgs { auto_configure_dns }).await,
        Command::InstallCa => commands::install_ca::execute(&config).await,
        Command::Uninstall { all } => commands::uninstall::execute(&config, commands::uninstall::UninstallArgs { all }).await,
        Command::Status => commands::status::execute(&config).await,
        Command::ConfigureDns { restore, force } => commands::configure_dns::execute(&config, commands::configure_dns::ConfigureDnsArgs { restore, force }).await,
        Command::Apikey { command } => {
            let command = match command {
                ApikeyCommand::Generate { label, role } => commands::apikey::ApikeyCommand::Generate { label, role },
                ApikeyCommand::List => commands::apikey::ApikeyCommand::List,
                ApikeyCommand::Revoke { id } => commands::apikey::ApikeyCommand::Revoke { id },
            };
            commands::apikey::execute(&config, command).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}
