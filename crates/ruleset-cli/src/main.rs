//! ruleset CLI tool.
//!
//! Usage:
//! ```bash
//! ruleset build [OPTIONS] [PATH]
//! ruleset check [OPTIONS] [PATH]
//! ruleset catalog [OPTIONS] [PATH]
//! ruleset init [PATH]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use ruleset_core::CheckMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Assemble categorized lint rule sets and verify them against rule catalogs
#[derive(Parser)]
#[command(name = "ruleset")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the linter configuration and print it as JSON
    Build {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write the configuration to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        mode: commands::ModeFlags,

        /// Never colour the check report
        #[arg(long)]
        no_color: bool,
    },

    /// Verify rule definitions against the rule catalogs
    Check {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only verify one section
        #[arg(short, long)]
        section: Option<String>,

        /// List every rule's status, not only problems
        #[arg(long)]
        verbose_check: bool,

        /// Print each finding with its diagnostic code and help
        #[arg(long)]
        explain: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Never colour the report
        #[arg(long)]
        no_color: bool,
    },

    /// List the rules known to the catalogs, by category
    Catalog {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only list the catalogs of one section
        #[arg(short, long)]
        section: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init {
        /// Directory to create `ruleset.toml` in
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for reports and listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            path,
            output,
            mode,
            no_color,
        } => {
            let env_value = std::env::var(CheckMode::ENV_VAR).ok();
            commands::build::run(
                &path,
                cli.config.as_deref(),
                output.as_deref(),
                mode.resolve(env_value.as_deref()),
                no_color,
            )
        }
        Commands::Check {
            path,
            section,
            verbose_check,
            explain,
            format,
            no_color,
        } => commands::check::run(
            &path,
            cli.config.as_deref(),
            &commands::check::CheckOptions {
                section,
                verbose: verbose_check,
                explain,
                format,
                no_color,
            },
        ),
        Commands::Catalog {
            path,
            section,
            format,
        } => commands::catalog::run(&path, cli.config.as_deref(), section.as_deref(), format),
        Commands::Init { path, force } => commands::init::run(&path, force),
    }
}
