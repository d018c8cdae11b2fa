use std::process::ExitCode;

use clap::Parser;

use crate::export::ExportError;
use crate::opts::{Command, Opts};
use crate::prelude::*;

mod export;
mod opts;
mod prelude;
mod tracing;
mod web;

pub use crate::prelude::Result;

#[tokio::main]
async fn main() -> ExitCode {
    let opts = Opts::parse();
    let sentry_guard =
        crate::tracing::init(opts.sentry_dsn.clone(), opts.traces_sample_rate, opts.verbosity);
    let _sentry_guard = match sentry_guard {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("failed to initialise tracing: {:#}", error);
            return ExitCode::FAILURE;
        }
    };
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    match run(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{:#}", error);
            sentry::integrations::anyhow::capture_anyhow(&error);
            error
                .chain()
                .find_map(|cause| cause.downcast_ref::<ExportError>())
                .map_or(ExitCode::FAILURE, ExportError::exit_code)
        }
    }
}

async fn run(opts: Opts) -> Result {
    match opts.subcommand {
        Command::Convert(opts) => {
            let span = info_span!("convert", input = ?opts.input, output = ?opts.output);
            export::run(opts).instrument(span).await
        }
        Command::Serve(opts) => {
            let span = info_span!("serve", root = ?opts.root);
            web::run(opts).instrument(span).await
        }
    }
}
