use std::fs::File;
use std::io::BufReader;

use clap::ValueEnum;
use serde::Deserialize;

use crate::export::error::ExportError;
use crate::prelude::*;

/// Shown when a pickle does not decode, which is the case for a pickled scikit-learn estimator.
const PICKLE_HINT: &str = "expected a mapping with plain-list `coef_` and `intercept_`, dump one \
    with `pickle.dump({\"coef_\": model.coef_.tolist(), \"intercept_\": model.intercept_.tolist()}, f)`";

/// Handle to a trained linear model.
pub trait LinearModel {
    /// `[output_dim][input_dim]`
    fn coefficients(&self) -> &[Vec<f64>];

    /// `[output_dim]`
    fn intercepts(&self) -> &[f64];
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Pickle,
    Json,
}

impl SourceFormat {
    /// `.json` files are JSON, anything else is assumed to be a pickle.
    pub fn detect(path: &Path) -> Self {
        match path.extension() {
            Some(extension) if extension.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pickle,
        }
    }
}

/// Linear model decoded from a source artifact.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "SourceRecord")]
pub struct SourceModel {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl SourceModel {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Self {
        Self {
            coefficients,
            intercepts,
        }
    }

    /// Decodes the artifact, guessing the format from the extension unless given.
    #[instrument(level = "debug", skip_all, fields(path = ?path))]
    pub fn load(path: &Path, format: Option<SourceFormat>) -> Result<Self, ExportError> {
        let name = base_name(path);
        let format = format.unwrap_or_else(|| SourceFormat::detect(path));
        debug!(?format, "loading the source model");

        let reader = BufReader::new(
            File::open(path).map_err(|error| ExportError::source_unavailable(&name, error))?,
        );
        match format {
            SourceFormat::Pickle => serde_pickle::from_reader(reader, Default::default())
                .map_err(|error| {
                    ExportError::source_unavailable(&name, format!("{}; {}", error, PICKLE_HINT))
                }),
            SourceFormat::Json => serde_json::from_reader(reader)
                .map_err(|error| ExportError::source_unavailable(&name, error)),
        }
    }
}

impl LinearModel for SourceModel {
    fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    fn intercepts(&self) -> &[f64] {
        &self.intercepts
    }
}

/// Base file name, used as the provenance of the exported record.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// On-disk layout: scikit-learn attribute names, or the names of an exported record.
#[derive(Deserialize)]
struct SourceRecord {
    #[serde(rename = "coef_", alias = "weights")]
    coefficients: Coefficients,

    #[serde(rename = "intercept_", alias = "biases")]
    intercepts: Intercepts,
}

/// Single-output models keep a flat coefficient vector.
#[derive(Deserialize)]
#[serde(untagged)]
enum Coefficients {
    Matrix(Vec<Vec<f64>>),
    Vector(Vec<f64>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Intercepts {
    Vector(Vec<f64>),
    Scalar(f64),
}

impl From<SourceRecord> for SourceModel {
    fn from(record: SourceRecord) -> Self {
        let coefficients = match record.coefficients {
            Coefficients::Matrix(matrix) => matrix,
            Coefficients::Vector(vector) => vec![vector],
        };
        let intercepts = match record.intercepts {
            Intercepts::Vector(vector) => vector,
            Intercepts::Scalar(scalar) => vec![scalar],
        };
        Self::new(coefficients, intercepts)
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct PickledModel<C, I> {
        coef_: C,
        intercept_: I,
    }

    fn write_pickle(path: &Path, model: &impl Serialize) -> crate::Result {
        std::fs::write(path, serde_pickle::to_vec(model, Default::default())?)?;
        Ok(())
    }

    #[test]
    fn detect_format_ok() {
        assert_eq!(SourceFormat::detect(Path::new("model.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::detect(Path::new("MODEL.JSON")), SourceFormat::Json);
        assert_eq!(SourceFormat::detect(Path::new("model.pkl")), SourceFormat::Pickle);
        assert_eq!(SourceFormat::detect(Path::new("model")), SourceFormat::Pickle);
    }

    #[test]
    fn base_name_ok() {
        assert_eq!(base_name(Path::new("/tmp/models/linear.pkl")), "linear.pkl");
        assert_eq!(base_name(Path::new("linear.pkl")), "linear.pkl");
    }

    #[test]
    fn load_pickle_ok() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("linear.pkl");
        write_pickle(
            &path,
            &PickledModel {
                coef_: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
                intercept_: vec![0.5, -0.5],
            },
        )?;

        let model = SourceModel::load(&path, None)?;
        assert_eq!(model.coefficients(), &[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(model.intercepts(), &[0.5, -0.5]);
        Ok(())
    }

    #[test]
    fn load_pickle_single_output_ok() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("single.pkl");
        write_pickle(
            &path,
            &PickledModel {
                coef_: vec![0.25, 0.75, 1.5],
                intercept_: 2.0,
            },
        )?;

        let model = SourceModel::load(&path, None)?;
        assert_eq!(model.coefficients(), &[vec![0.25, 0.75, 1.5]]);
        assert_eq!(model.intercepts(), &[2.0]);
        Ok(())
    }

    #[test]
    fn load_pickle_extra_keys_and_integers_ok() -> crate::Result {
        #[derive(Serialize)]
        struct FittedModel {
            coef_: Vec<Vec<i64>>,
            intercept_: Vec<i64>,
            n_features_in_: i64,
            rank_: i64,
        }

        let directory = tempfile::tempdir()?;
        let path = directory.path().join("linear.pkl");
        write_pickle(
            &path,
            &FittedModel {
                coef_: vec![vec![1, -2]],
                intercept_: vec![0],
                n_features_in_: 2,
                rank_: 1,
            },
        )?;

        let model = SourceModel::load(&path, None)?;
        assert_eq!(model.coefficients(), &[vec![1.0, -2.0]]);
        assert_eq!(model.intercepts(), &[0.0]);
        Ok(())
    }

    #[test]
    fn load_json_ok() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("linear.json");
        // language=JSON
        std::fs::write(&path, r#"{"coef_": [[1.0, 2.0], [3.0, 4.0]], "intercept_": [0.5, -0.5]}"#)?;

        let model = SourceModel::load(&path, None)?;
        assert_eq!(model, SourceModel::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec![0.5, -0.5]));
        Ok(())
    }

    #[test]
    fn load_exported_record_ok() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("exported.json");
        std::fs::write(
            &path,
            // language=JSON
            r#"{"weights":[[1.0]],"biases":[0.0],"input_dim":1,"output_dim":1,"metadata":{"description":"","created_from":"a.pkl"}}"#,
        )?;

        let model = SourceModel::load(&path, None)?;
        assert_eq!(model, SourceModel::new(vec![vec![1.0]], vec![0.0]));
        Ok(())
    }

    #[test]
    fn format_override_ok() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("linear.model");
        // language=JSON
        std::fs::write(&path, r#"{"coef_": [1.0], "intercept_": 0.0}"#)?;

        assert!(SourceModel::load(&path, None).is_err());
        assert_eq!(
            SourceModel::load(&path, Some(SourceFormat::Json))?,
            SourceModel::new(vec![vec![1.0]], vec![0.0]),
        );
        Ok(())
    }

    #[test]
    fn load_missing_unavailable() {
        let error = SourceModel::load(Path::new("/nonexistent/linear.pkl"), None).unwrap_err();
        match error {
            ExportError::SourceUnavailable { name, .. } => assert_eq!(name, "linear.pkl"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn load_garbage_unavailable() -> crate::Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("linear.pkl");
        std::fs::write(&path, b"\xff\xfe not a pickle")?;

        match SourceModel::load(&path, None).unwrap_err() {
            ExportError::SourceUnavailable { reason, .. } => assert!(reason.contains(".tolist()")),
            _ => unreachable!(),
        }
        Ok(())
    }
}
