//! bsl-analyzer CLI tool.
//!
//! Usage:
//! ```bash
//! bsl-analyzer check [OPTIONS] [PATH]
//! bsl-analyzer watch [OPTIONS] [PATH]
//! bsl-analyzer run-rule <CODE> <FILE>
//! bsl-analyzer list-rules [--language en|ru]
//! bsl-analyzer init
//! ```

use anyhow::Result;
use bsl_analyzer::rules::BuiltinError;
use bsl_analyzer::{Language, SessionError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Diagnostics for 1C:Enterprise (BSL) modules and OneScript (OS) scripts
#[derive(Parser)]
#[command(name = "bsl-analyzer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "BSL_ANALYZER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run diagnostics
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Run diagnostics and re-run them whenever the configuration changes
    Watch {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Run one rule on one file, even if it is disabled or out of scope
    RunRule {
        /// Rule code, e.g. `LineLength`
        code: String,

        /// File to analyze
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List available rules
    ListRules {
        /// Language of rule names and descriptions
        #[arg(short, long, default_value = "ru")]
        language: LanguageArg,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: ListFormat,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,

        /// Diagnostic language written to the config
        #[arg(short, long, default_value = "ru")]
        language: LanguageArg,
    },
}

/// Output format for analysis results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

/// Output format for the rule listing.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ListFormat {
    /// Aligned table.
    #[default]
    Text,
    /// JSON array.
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LanguageArg {
    /// English
    En,
    /// Russian
    Ru,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Self::En,
            LanguageArg::Ru => Self::Ru,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        report_error(err);
        std::process::exit(2);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Check {
            path,
            format,
            rules,
            exclude,
        } => commands::check::run(&path, format, rules, exclude, config),
        Commands::Watch {
            path,
            format,
            rules,
            exclude,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::watch::run(&path, format, rules, exclude, config))
        }
        Commands::RunRule { code, file, format } => {
            commands::run_rule::run(&code, &file, format, config)
        }
        Commands::ListRules { language, format } => commands::list_rules::run(language.into(), format),
        Commands::Init { force, language } => commands::init::run(language.into(), force),
    }
}

/// Renders engine errors with their diagnostic codes and help text.
fn report_error(err: anyhow::Error) {
    let err = match err.downcast::<SessionError>() {
        Ok(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            return;
        }
        Err(other) => other,
    };
    match err.downcast::<BuiltinError>() {
        Ok(e) => eprintln!("{:?}", miette::Report::new(e)),
        Err(other) => eprintln!("Error: {other:?}"),
    }
}
