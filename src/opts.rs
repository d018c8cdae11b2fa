//! CLI options.

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::export::SourceFormat;
use crate::prelude::*;

pub mod parsers;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Opts {
    /// Sentry DSN
    #[arg(long, env = "SENTRY_DSN")]
    pub sentry_dsn: Option<String>,

    /// Performance monitoring sample rate for Sentry
    #[arg(long, default_value = "0", env = "SPARC_PREP_TRACES_SAMPLE_RATE")]
    pub traces_sample_rate: f32,

    /// Increases log verbosity
    #[arg(short, long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub subcommand: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Convert(ConvertOpts),
    Serve(ServeOpts),
}

/// Converts a pickled linear model into the JSON weight file
#[derive(Args)]
pub struct ConvertOpts {
    /// Source model artifact: a pickle or JSON mapping of plain-list `coef_` and `intercept_`
    /// (dump an estimator with `{"coef_": m.coef_.tolist(), "intercept_": m.intercept_.tolist()}`)
    #[arg(short, long, default_value = "wavlm_large-9_cut-10_mngu_linear.pkl")]
    pub input: PathBuf,

    /// Destination JSON file, overwritten if it exists
    #[arg(short, long, default_value = "wavlm_linear_model.json")]
    pub output: PathBuf,

    /// Source format, detected from the input extension by default
    #[arg(long, value_enum)]
    pub format: Option<SourceFormat>,
}

/// Serves static files with permissive CORS and caching disabled
#[derive(Args)]
pub struct ServeOpts {
    /// Bind host
    #[arg(long, default_value = "0.0.0.0", env = "SPARC_PREP_HOST")]
    pub host: String,

    /// Bind port
    #[arg(short, long, default_value = "8000", env = "SPARC_PREP_PORT")]
    pub port: u16,

    /// Directory to serve
    #[arg(
        long,
        default_value = ".",
        env = "SPARC_PREP_ROOT",
        value_parser = parsers::existing_directory,
    )]
    pub root: PathBuf,
}
