use serde::Serialize;

use crate::export::error::ExportError;
use crate::export::source::LinearModel;

pub const DESCRIPTION: &str = "Linear projection model for SPARC articulatory features";

/// Output legend: x and y coordinates of the upper lip, lower lip, lower incisor,
/// tongue tip, tongue body and tongue dorsum.
pub const ARTICULATORY_FEATURES: [&str; 12] = [
    "ul_x", "ul_y", "ll_x", "ll_y", "li_x", "li_y", "tt_x", "tt_y", "tb_x", "tb_y", "td_x", "td_y",
];

/// The exported record. Field order is the key order of the written file.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct LinearModelParameters {
    /// `[output_dim][input_dim]`
    pub weights: Vec<Vec<f64>>,

    pub biases: Vec<f64>,
    pub input_dim: usize,
    pub output_dim: usize,
    pub metadata: Metadata,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct Metadata {
    pub description: String,

    /// One label per output dimension, omitted when the legend does not fit the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,

    /// Base file name of the source artifact.
    pub created_from: String,
}

impl LinearModelParameters {
    /// Copies the model's coefficients into a fresh record, checking every shape invariant.
    pub fn from_model(
        model: &impl LinearModel,
        created_from: impl Into<String>,
    ) -> Result<Self, ExportError> {
        let created_from = created_from.into();
        let coefficients = model.coefficients();
        let intercepts = model.intercepts();

        let output_dim = coefficients.len();
        if output_dim == 0 {
            return Err(ExportError::source_unavailable(
                created_from,
                "the coefficient matrix is empty",
            ));
        }
        let input_dim = coefficients[0].len();
        if input_dim == 0 {
            return Err(ExportError::source_unavailable(
                created_from,
                "the coefficient rows are empty",
            ));
        }
        if let Some((i, row)) = coefficients
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != input_dim)
        {
            return Err(ExportError::source_unavailable(
                created_from,
                format!("row {} has {} columns, expected {}", i, row.len(), input_dim),
            ));
        }
        if coefficients.iter().flatten().chain(intercepts).any(|value| !value.is_finite()) {
            return Err(ExportError::source_unavailable(
                created_from,
                "the model contains non-finite values",
            ));
        }
        if intercepts.len() != output_dim {
            return Err(ExportError::ShapeMismatch {
                output_dim,
                n_intercepts: intercepts.len(),
            });
        }

        let features = (output_dim == ARTICULATORY_FEATURES.len())
            .then(|| ARTICULATORY_FEATURES.iter().map(ToString::to_string).collect());

        Ok(Self {
            weights: coefficients.to_vec(),
            biases: intercepts.to_vec(),
            input_dim,
            output_dim,
            metadata: Metadata {
                description: DESCRIPTION.to_string(),
                features,
                created_from,
            },
        })
    }
}
