pub use std::path::{Path, PathBuf};

pub use anyhow::{anyhow, Context};
pub use tracing::{debug, error, info, info_span, instrument, Instrument, Span};

pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
