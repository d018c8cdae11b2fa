//! Linear model parameter export.

use std::fs;
use std::io::{self, BufWriter, Write};

use human_repr::HumanCount;
use tempfile::NamedTempFile;

pub use self::error::ExportError;
pub use self::parameters::LinearModelParameters;
pub use self::source::{LinearModel, SourceFormat, SourceModel};
use crate::opts::ConvertOpts;
use crate::prelude::*;

pub mod error;
pub mod parameters;
pub mod source;

/// Operator-facing progress sink.
pub trait Reporter {
    fn report(&self, message: &str);
}

/// Forwards the reports to the log.
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, message: &str) {
        info!("{}", message);
    }
}

pub async fn run(opts: ConvertOpts) -> Result {
    let span = Span::current();
    tokio::task::spawn_blocking(move || {
        span.in_scope(|| convert(&opts.input, &opts.output, opts.format, &TracingReporter))
    })
    .await
    .context("the export task has panicked")??;
    Ok(())
}

/// Loads the source artifact and exports its parameters to `destination`.
#[instrument(skip_all, fields(source = ?source, destination = ?destination))]
pub fn convert(
    source: &Path,
    destination: &Path,
    format: Option<SourceFormat>,
    reporter: &impl Reporter,
) -> Result<LinearModelParameters, ExportError> {
    reporter.report(&format!("Loading linear model from {}", source.display()));
    let model = SourceModel::load(source, format)?;
    export_parameters(&model, source::base_name(source), destination, reporter)
}

/// Writes the model parameters to `destination`, replacing any existing file.
///
/// The record goes to a temporary file next to the destination first and is renamed into place
/// only after it has been completely written, so a failure never leaves a partial file behind.
pub fn export_parameters(
    model: &impl LinearModel,
    created_from: impl Into<String>,
    destination: &Path,
    reporter: &impl Reporter,
) -> Result<LinearModelParameters, ExportError> {
    let parameters = LinearModelParameters::from_model(model, created_from)?;

    reporter.report(&format!("Saving model to {}", destination.display()));
    write_atomically(&parameters, destination)
        .map_err(|error| ExportError::write_failure(destination, error))?;

    let size = fs::metadata(destination)
        .map_err(|error| ExportError::write_failure(destination, error))?
        .len();
    reporter.report("Model converted successfully:");
    reporter.report(&format!("  - Input dimensions: {}", parameters.input_dim));
    reporter.report(&format!("  - Output dimensions: {}", parameters.output_dim));
    reporter.report(&format!("  - JSON file size: {}", size.human_count_bytes()));

    Ok(parameters)
}

fn write_atomically(parameters: &LinearModelParameters, destination: &Path) -> io::Result<()> {
    let file = create_temp_file(destination)?;
    debug!(temp_path = ?file.path());

    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, parameters)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|error| error.into_error())?;
    file.as_file().sync_all()?;
    file.persist(destination).map_err(|error| error.error)?;
    Ok(())
}

/// Creates the temporary file next to `destination` with the permissions the final file should
/// end up with: those of the replaced file, or the umask-filtered `0o666` for a new one.
fn create_temp_file(destination: &Path) -> io::Result<NamedTempFile> {
    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let file = builder.tempfile_in(directory)?;
    match fs::metadata(destination) {
        Ok(metadata) if metadata.is_file() => {
            file.as_file().set_permissions(metadata.permissions())?;
        }
        _ => {}
    }
    Ok(file)
}
