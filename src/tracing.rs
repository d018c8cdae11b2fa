use std::borrow::Cow;

use sentry::integrations::tracing::EventFilter;
use sentry::{ClientInitGuard, ClientOptions};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::prelude::*;

/// Initialises tracing.
///
/// `SPARC_PREP_LOG` and `SPARC_PREP_SENTRY_LOG` override the directives derived from `verbosity`.
pub fn init(
    sentry_dsn: Option<String>,
    traces_sample_rate: f32,
    verbosity: u8,
) -> Result<ClientInitGuard> {
    let guard = sentry::init((
        sentry_dsn,
        ClientOptions {
            release: Some(Cow::Borrowed(env!("CARGO_PKG_VERSION"))),
            traces_sample_rate,
            ..Default::default()
        },
    ));

    let sentry_filter = EnvFilter::try_from_env("SPARC_PREP_SENTRY_LOG")
        .or_else(|_| EnvFilter::try_new(sentry_directives(verbosity)))?;
    let sentry_layer = sentry::integrations::tracing::layer()
        .event_filter(|metadata| match metadata.level() {
            &Level::ERROR | &Level::WARN => EventFilter::Event,
            &Level::INFO | &Level::DEBUG | &Level::TRACE => EventFilter::Breadcrumb,
        })
        .span_filter(|metadata| {
            matches!(metadata.level(), &Level::ERROR | &Level::WARN | &Level::INFO)
        })
        .with_filter(sentry_filter);

    let format_filter = EnvFilter::try_from_env("SPARC_PREP_LOG")
        .or_else(|_| EnvFilter::try_new(format_directives(verbosity)))?;
    let format_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_filter(format_filter);

    tracing_subscriber::Registry::default()
        .with(sentry_layer)
        .with(format_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guard)
}

/// Console directives: the exporter's reports at the default level, the server internals only
/// once they are asked for.
fn format_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "sparc_prep=info,poem=warn",
        1 => "sparc_prep=debug,poem=info",
        _ => "sparc_prep=trace,poem=debug",
    }
}

/// Sentry breadcrumbs always keep the debug trail, so a reported failure shows the source format
/// and the temporary file path.
fn sentry_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 | 1 => "sparc_prep=debug,poem=warn",
        _ => "sparc_prep=trace,poem=info",
    }
}
