//! Inference
//!
//! Turns a landmark feature vector into a letter and a confidence:
//! validate → single-row matrix → scale → predict → decode → confidence.

use ndarray::Array2;
use serde::Serialize;

use crate::artifacts::classifier::{softmax, DecisionScores};
use crate::artifacts::{ArtifactBundle, Classifier};
use crate::error::{AppError, AppResult, InferenceError};

pub const LANDMARK_COUNT: usize = 21;
pub const COORDS_PER_LANDMARK: usize = 3;
/// x, y, z for each of the 21 hand landmarks
pub const FEATURE_COUNT: usize = LANDMARK_COUNT * COORDS_PER_LANDMARK;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: Option<f64>,
}

/// Run one feature vector through the bundle.
pub fn predict(bundle: &ArtifactBundle, features: &[f64]) -> AppResult<Prediction> {
    let classifier = bundle.classifier.as_ref().ok_or_else(|| {
        AppError::NotReady("Model not loaded. Please check server logs.".to_string())
    })?;
    let decoder = bundle.label_decoder.as_ref().ok_or_else(|| {
        AppError::NotReady("Label encoder not loaded. Please check server logs.".to_string())
    })?;

    if features.len() != FEATURE_COUNT {
        return Err(AppError::InvalidInput {
            expected: FEATURE_COUNT,
            got: features.len(),
        });
    }

    let mut x = Array2::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
        .map_err(InferenceError::from)?;

    if let Some(scaler) = &bundle.scaler {
        x = scaler.transform(&x)?;
    }

    let index = classifier
        .predict(&x)?
        .first()
        .copied()
        .ok_or_else(|| InferenceError::InvalidArtifact("classifier returned no prediction".to_string()))?;

    let label = decoder.decode(index)?;
    let confidence = confidence(classifier, &x)?;

    Ok(Prediction { label, confidence })
}

/// Probabilities win over decision scores; plain classifiers give none.
pub fn confidence(classifier: &Classifier, x: &Array2<f64>) -> Result<Option<f64>, InferenceError> {
    let value = match classifier {
        Classifier::Probabilistic(model) => {
            let proba = model.predict_proba(x)?;
            Some(row_max(proba.row(0).iter().copied()))
        }
        Classifier::ScoreOnly(model) => match model.decision_function(x)? {
            // A two-class model yields one scalar score, which is not normalized.
            DecisionScores::Binary(_) => None,
            DecisionScores::Multiclass(scores) => {
                Some(row_max(softmax(scores.row(0)).iter().copied()))
            }
        },
        Classifier::Plain(_) => None,
    };

    Ok(value.filter(|c| c.is_finite()))
}

fn row_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}
