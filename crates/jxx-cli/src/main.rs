//! Jxx command-line tool
//!
//! Translates Java sources to a C++ header and implementation file, or only
//! checks them.

mod commands;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jxx_engine::{TranslatorConfig, CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "JXX_LOG";

#[derive(Parser)]
#[command(name = "jxx")]
#[command(about = "Translate a Java subset to C++", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: ./jxx.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// When to color diagnostics
    #[arg(long, global = true, value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    /// Log at debug level unless JXX_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate Java files to C++
    Translate {
        /// Java source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print the parsed input back as Java
        #[arg(long)]
        print_input: bool,
        /// Print the lowered classes
        #[arg(long)]
        print_lowered: bool,
        /// Write the output files instead of printing them
        #[arg(short, long)]
        write: bool,
        /// Output directory (overrides output.directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Parse and analyze without emitting anything
    Check {
        /// Java source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(cli.verbose, &config.log.level);
    let color = output::resolve_color_choice(cli.color.as_deref());

    match cli.command {
        Commands::Translate {
            files,
            print_input,
            print_lowered,
            write,
            out_dir,
        } => {
            let options = commands::translate::TranslateOptions {
                print_input,
                print_lowered,
                write,
                out_dir,
            };
            commands::translate::execute(files, options, config, color)
        }

        Commands::Check { files } => commands::check::execute(files, config, color),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TranslatorConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(CONFIG_FILE).exists() => Path::new(CONFIG_FILE),
        None => return Ok(TranslatorConfig::default()),
    };
    TranslatorConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
}

/// `JXX_LOG` wins over `--verbose`, which wins over `log.level`.
fn init_tracing(verbose: bool, level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("tracing initialized");
}
