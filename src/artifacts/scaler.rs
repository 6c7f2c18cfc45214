//! Feature Scaler
//!
//! Optional normalization applied to the raw landmark row before it
//! reaches the classifier. Parameters come from the fitted scaler export.

use ndarray::{Array1, Array2};
use serde::Deserialize;

use crate::error::{ArtifactError, InferenceError};

/// On-disk scaler layout
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerFile {
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

/// Fitted scaler, parameters held as ndarray vectors
#[derive(Debug, Clone)]
pub enum FeatureScaler {
    /// `(x - mean) / scale`
    Standard { mean: Array1<f64>, scale: Array1<f64> },
    /// `x * scale + min`
    MinMax { min: Array1<f64>, scale: Array1<f64> },
}

impl FeatureScaler {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureScaler::Standard { .. } => "StandardScaler",
            FeatureScaler::MinMax { .. } => "MinMaxScaler",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            FeatureScaler::Standard { mean, .. } => mean.len(),
            FeatureScaler::MinMax { min, .. } => min.len(),
        }
    }

    /// Apply the scaler to every row of `x`.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        if x.ncols() != self.n_features() {
            return Err(InferenceError::FeatureWidth {
                expected: self.n_features(),
                got: x.ncols(),
                component: self.name(),
            });
        }

        let scaled = match self {
            FeatureScaler::Standard { mean, scale } => (x - mean) / scale,
            FeatureScaler::MinMax { min, scale } => x * scale + min,
        };
        Ok(scaled)
    }
}

impl TryFrom<ScalerFile> for FeatureScaler {
    type Error = ArtifactError;

    fn try_from(file: ScalerFile) -> Result<Self, Self::Error> {
        match file {
            ScalerFile::Standard { mean, scale } => {
                check_widths("mean", mean.len(), scale.len())?;
                // Constant features were fitted with a zero scale; leave them unscaled.
                let scale = scale
                    .into_iter()
                    .map(|s| if s == 0.0 { 1.0 } else { s })
                    .collect::<Vec<_>>();
                Ok(FeatureScaler::Standard {
                    mean: Array1::from(mean),
                    scale: Array1::from(scale),
                })
            }
            ScalerFile::MinMax { min, scale } => {
                check_widths("min", min.len(), scale.len())?;
                Ok(FeatureScaler::MinMax {
                    min: Array1::from(min),
                    scale: Array1::from(scale),
                })
            }
        }
    }
}

fn check_widths(offset_name: &str, offset_len: usize, scale_len: usize) -> Result<(), ArtifactError> {
    if offset_len == 0 {
        return Err(ArtifactError::Invalid(format!("scaler has an empty {} vector", offset_name)));
    }
    if offset_len != scale_len {
        return Err(ArtifactError::Invalid(format!(
            "scaler {} has {} entries but scale has {}",
            offset_name, offset_len, scale_len
        )));
    }
    Ok(())
}
