use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use smblinks::config::{format_config, Config};
use smblinks::discovery::Discovery;
use smblinks::links::LinkFarm;
use smblinks::logging::{init_logging, LogConfig, Verbosity};
use smblinks::output::{self, get_formatter, OutputFormat, OutputFormatter};
use smblinks::picker;
use smblinks::session::Session;

#[derive(Parser)]
#[command(name = "smblinks")]
#[command(version)]
#[command(about = "Mount SMB shares and keep stable symlinks to them")]
#[command(
    long_about = "Discovers the shares an SMB server exposes, mounts and unmounts them with gio, and keeps one symlink per mounted share in a links directory (~/SMBLinks by default)."
)]
struct Cli {
    /// Server to connect to (default: from config, else "lagrange")
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write debug logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the server's shares and whether each is mounted
    List,
    /// Mount shares and link them
    Mount {
        /// Share names
        #[arg(required = true)]
        shares: Vec<String>,
    },
    /// Remove the links of shares and unmount them
    Unmount {
        /// Share names
        #[arg(required = true)]
        shares: Vec<String>,
    },
    /// Unmount every share that is currently linked
    UnmountAll,
    /// Show the links directory
    Status,
    /// Choose shares and actions interactively
    Pick,
    /// View or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default server
    SetServer { name: String },
    /// Set the links directory
    SetLinksDir { path: PathBuf },
    /// Set the fallback shares used when discovery finds nothing
    SetFallback {
        #[arg(required = true)]
        shares: Vec<String>,
    },
    /// Remove all configuration
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = init_logging(&LogConfig {
        verbosity: Verbosity::from_count(cli.verbose),
        log_file: cli.log_file.clone(),
    });

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let out = get_formatter(format);

    match run(cli, out.as_ref()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            out.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Run the selected command; `Ok(false)` means some share failed.
fn run(cli: Cli, out: &dyn OutputFormatter) -> Result<bool> {
    let config = Config::load().context("Failed to load configuration")?;
    let server = config.effective_server(cli.server.as_deref());

    match cli.command {
        Commands::Config { action } => {
            configure(config, action, out)?;
            Ok(true)
        }
        Commands::List => {
            let (session, discovery) = connect(&config, &server)?;
            output::report_discovery(out, &server, &discovery);
            output::report_shares(out, &server, Some(&discovery), &session.list_shares());
            Ok(true)
        }
        Commands::Mount { shares } => {
            let (mut session, _) = connect(&config, &server)?;
            let results = session.mount_many(&shares)?;
            Ok(output::report_mounts(out, &results))
        }
        Commands::Unmount { shares } => {
            let (mut session, _) = connect(&config, &server)?;
            let results = session.unmount_many(&shares)?;
            Ok(output::report_unmounts(out, &results))
        }
        Commands::UnmountAll => {
            let (mut session, _) = connect(&config, &server)?;
            let results = session.unmount_all()?;
            Ok(output::report_unmounts(out, &results))
        }
        Commands::Status => {
            let links = LinkFarm::new(config.effective_links_dir());
            let entries = links
                .entries()
                .context("Failed to read links directory")?;
            output::report_links(out, &entries);
            Ok(entries.iter().all(|e| !e.dangling))
        }
        Commands::Pick => {
            let (mut session, discovery) = connect(&config, &server)?;
            output::report_discovery(out, &server, &discovery);
            picker::run(&mut session, out)?;
            Ok(true)
        }
    }
}

/// Open a session on `server` backed by smbclient and gio.
fn connect(config: &Config, server: &str) -> Result<(Session, Discovery)> {
    let mut session = Session::from_config(config);
    let discovery = session
        .set_server(server)
        .with_context(|| format!("Failed to connect to {}", server))?;
    Ok((session, discovery))
}

fn configure(
    mut config: Config,
    action: Option<ConfigAction>,
    out: &dyn OutputFormatter,
) -> Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            out.print_json(&serde_json::to_value(&config)?);
            for line in format_config(&config).lines() {
                out.info(line);
            }
            return Ok(());
        }
        ConfigAction::SetServer { name } => config.set_default_server(Some(name)),
        ConfigAction::SetLinksDir { path } => config.set_links_dir(Some(path)),
        ConfigAction::SetFallback { shares } => config.set_fallback_shares(Some(shares)),
        ConfigAction::Reset => config = Config::new(),
    }

    config.save().context("Failed to save configuration")?;
    let path = Config::config_path()?;
    out.success(&format!("Configuration saved to {}", path.display()));
    Ok(())
}
