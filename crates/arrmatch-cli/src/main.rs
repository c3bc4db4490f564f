use clap::{ArgAction, Parser, Subcommand};
use commands::{check, fix, libraries};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "arrmatch")]
#[command(about = "arrmatch - Fix Plex matches using Sonarr and Radarr as the source of truth")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Configuration file (defaults to <config dir>/arrmatch/config.toml)
    #[arg(long, global = true, env = "ARRMATCH_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write logs to this file, rotated daily
    #[arg(long, global = true, env = "ARRMATCH_LOG", value_name = "PATH")]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix mismatched Plex items
    #[command(long_about = "Compare the given Plex libraries with the given PVRs by file path, split Plex items that were merged together, and re-match every item whose GUID disagrees with the PVR's. All libraries must be of the type the PVRs manage (Sonarr for TV, Radarr for movies).")]
    Fix {
        /// PVR to use as the source of truth, by configured name (repeatable)
        #[arg(long = "pvr", value_name = "NAME", required = true, env = "ARRMATCH_PVR", value_delimiter = ',')]
        pvrs: Vec<String>,

        /// Plex library to fix, by name (repeatable)
        #[arg(long = "library", value_name = "NAME", required = true, env = "ARRMATCH_LIBRARY", value_delimiter = ',')]
        libraries: Vec<String>,

        /// Log the splits and matches that would be made without making them
        #[arg(long, action = ArgAction::SetTrue, env = "ARRMATCH_DRY_RUN")]
        dry_run: bool,
    },
    /// List the libraries in the Plex database
    Libraries,
    /// Validate the configuration and check that Plex is reachable
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli.log.clone().or_else(logging::default_log_file);
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_path = commands::config_path(cli.config);

    match cli.command {
        Commands::Fix {
            pvrs,
            libraries,
            dry_run,
        } => fix::run_fix(&config_path, pvrs, libraries, dry_run, &output).await,
        Commands::Libraries => libraries::run_libraries(&config_path, &output),
        Commands::Check => check::run_check(&config_path, &output).await,
    }
}
