//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod args;
mod classify;
mod url;
mod vocab;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, load_vocabulary, merge_cli_overrides, CliOverrides, ConfigError};
use crate::vocabulary::Vocabulary;

pub use args::{parse_list, parse_pair, parse_pairs};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// cldurl - resolve scoped media options into delivery URLs
#[derive(Parser)]
#[command(name = "cldurl")]
#[command(about = "Resolve scoped media transformation options into delivery URLs")]
#[command(version)]
pub struct Cli {
    /// Log resolution steps to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the delivery URL for a public id
    Url {
        /// Public id of the resource
        public_id: String,

        /// Path to cld.toml (default: discovered from the working directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cloud name (overrides the config file)
        #[arg(long)]
        cloud_name: Option<String>,

        /// Use https delivery
        #[arg(long)]
        secure: bool,

        /// Vocabulary table to use instead of the configured one
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Responsive breakpoint step (overrides the config file)
        #[arg(long)]
        breakpoint_step: Option<u32>,

        /// Enclosing scope as comma-separated key=value pairs, outermost first.
        /// Repeat for deeper nesting.
        #[arg(long = "scope", value_name = "PAIRS")]
        scopes: Vec<String>,

        /// Option on the image itself (key=value). Repeatable.
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Chained transformation as comma-separated key=value pairs.
        /// Repeat for each step.
        #[arg(long = "step", value_name = "PAIRS")]
        steps: Vec<String>,

        /// Container width in pixels for responsive `width=auto`
        #[arg(long)]
        container_width: Option<f64>,

        /// Also print the forwarded attributes as JSON
        #[arg(long)]
        attrs: bool,
    },

    /// Split key=value options into recognized and pass-through sets
    Classify {
        /// Options as key=value, in any spelling
        pairs: Vec<String>,

        /// Path to cld.toml (default: discovered from the working directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Vocabulary table to classify against (overrides the config file)
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },

    /// List the option vocabulary
    Vocab {
        /// Path to cld.toml (default: discovered from the working directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Vocabulary table to list (overrides the config file)
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Only list options with this role
        #[arg(long, value_parser = ["transformation", "url", "responsive"])]
        role: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Install the stderr log subscriber.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` applies, defaulting to
/// `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the vocabulary a command runs against.
///
/// `--vocabulary` wins over the table named in cld.toml; without either the
/// built-in table is used.
pub(crate) fn command_vocabulary(
    config: Option<&Path>,
    vocabulary: Option<&Path>,
) -> Result<Vocabulary, ConfigError> {
    let mut loaded = load_config(config)?;
    let overrides =
        CliOverrides { vocabulary: vocabulary.map(Path::to_path_buf), ..Default::default() };
    merge_cli_overrides(&mut loaded, &overrides);
    load_vocabulary(&loaded)
}

/// Parse arguments and run the selected command
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Url {
            public_id,
            config,
            cloud_name,
            secure,
            vocabulary,
            breakpoint_step,
            scopes,
            options,
            steps,
            container_width,
            attrs,
        } => url::run_url(url::UrlArgs {
            public_id: &public_id,
            config: config.as_deref(),
            cloud_name: cloud_name.as_deref(),
            secure,
            vocabulary: vocabulary.as_ref(),
            breakpoint_step,
            scopes: &scopes,
            options: &options,
            steps: &steps,
            container_width,
            attrs,
        }),
        Commands::Classify { pairs, config, vocabulary } => {
            classify::run_classify(&pairs, config.as_deref(), vocabulary.as_deref())
        }
        Commands::Vocab { config, vocabulary, role, json } => {
            vocab::run_vocab(config.as_deref(), vocabulary.as_deref(), role.as_deref(), json)
        }
    }
}
