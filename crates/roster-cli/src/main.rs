#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use roster_core::ErrorCode;
use roster_core::config::{RosterConfig, load_config_from, load_user_config};
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "roster: people directory with debounced name/city filtering",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Users endpoint (overrides `ROSTER_SOURCE_URL` and the config file).
    #[arg(long, global = true, value_name = "URL")]
    source: Option<String>,

    /// Read users from a local JSON file instead of the network.
    #[arg(long, global = true, value_name = "FILE", conflicts_with = "source")]
    input: Option<PathBuf>,

    /// Request timeout in seconds for the users endpoint.
    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Config file to use instead of the per-user one.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format for one-shot commands.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Write logs to this file. The TUI logs nowhere else.
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    const fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }

    fn sources(&self) -> cmd::SourceSelection {
        cmd::SourceSelection {
            url: self.source.clone(),
            input: self.input.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    fn load_config(&self) -> anyhow::Result<RosterConfig> {
        self.config
            .as_deref()
            .map_or_else(load_user_config, load_config_from)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Browse the directory interactively (default)",
        long_about = "Open the full-screen directory. `/` filters by name, `c` picks a city, `h` highlights the oldest person per city, `q` quits.",
        after_help = "EXAMPLES:\n    # Browse the default users endpoint\n    roster\n\n    # Browse a local file\n    roster tui --input users.json"
    )]
    Tui,

    #[command(
        about = "List people matching filters",
        long_about = "Load the directory once, apply name/city filters, and print the matching people.",
        after_help = "EXAMPLES:\n    # Everyone whose first or last name contains \"john\"\n    roster list --name john\n\n    # Everyone in Boston, oldest marked\n    roster list --city Boston --highlight-oldest\n\n    # Emit machine-readable output\n    roster list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "List the distinct cities",
        after_help = "EXAMPLES:\n    roster cities --input users.json"
    )]
    Cities,

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    roster completions bash > ~/.local/share/bash-completion/completions/roster"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, log_file: Option<&Path>, interactive: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("ROSTER_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "roster=debug,info"
        } else {
            "roster=info,warn"
        })
    });

    let writer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        // Anything written to the terminal would corrupt the alternate screen.
        None if interactive => return Ok(()),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = log_file.is_none();

    let format = env::var("ROSTER_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
                .init();
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref(), cli.is_interactive())?;

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = resolve_output_mode(cli.format, cli.json);
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => {
            render_error(
                output,
                &CliError::with_code(format!("{err:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(err);
        }
    };
    let sources = cli.sources();

    match cli.command {
        None | Some(Commands::Tui) => {
            tui::run_tui(sources.build(&config), config.filter.quiet_window())
        }
        Some(Commands::List(ref args)) => cmd::list::run_list(args, &sources, &config, output),
        Some(Commands::Cities) => cmd::cities::run_cities(&sources, &config, output),
        Some(Commands::Completions(ref args)) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
