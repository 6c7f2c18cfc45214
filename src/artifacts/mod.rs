//! Artifact Bundle
//!
//! Classifier, label decoder and optional scaler, loaded once at startup
//! from the artifact directory and shared read-only by every request.
//! A missing or unreadable file leaves its slot empty; startup never fails.

pub mod classifier;
pub mod label_decoder;
pub mod scaler;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ArtifactError;

pub use classifier::{Classifier, ClassifierFile};
pub use label_decoder::LabelDecoder;
pub use scaler::{FeatureScaler, ScalerFile};

pub const MODEL_FILE: &str = "linear_svm_model.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";
pub const SCALER_FILE: &str = "scaler.json";

/// Readiness derived from which artifacts were loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    NotReady,
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactBundle {
    pub classifier: Option<Classifier>,
    pub label_decoder: Option<LabelDecoder>,
    pub scaler: Option<FeatureScaler>,
}

impl ArtifactBundle {
    pub fn new(
        classifier: Option<Classifier>,
        label_decoder: Option<LabelDecoder>,
        scaler: Option<FeatureScaler>,
    ) -> Self {
        Self { classifier, label_decoder, scaler }
    }

    /// Load every artifact found in `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();

        let classifier = load_artifact(&dir.join(MODEL_FILE), "Model", true, |file: ClassifierFile| {
            Classifier::try_from(file)
        });
        if let Some(model) = &classifier {
            tracing::info!(
                "  Model type: {} ({} classes, {} features)",
                model.name(),
                model.classes().len(),
                model.n_features()
            );
        }

        let label_decoder = load_artifact(
            &dir.join(LABEL_ENCODER_FILE),
            "Label encoder",
            true,
            |decoder: LabelDecoder| decoder.validated(),
        );
        match &label_decoder {
            Some(decoder) if decoder.supports_inverse() => {
                tracing::info!("  Classes: {:?}", decoder.classes().unwrap_or_default());
            }
            Some(_) => tracing::info!("  No inverse mapping, labels are raw class indices"),
            None => {}
        }

        let scaler = load_artifact(&dir.join(SCALER_FILE), "Scaler", false, |file: ScalerFile| {
            FeatureScaler::try_from(file)
        });

        let bundle = Self::new(classifier, label_decoder, scaler);
        bundle.warn_on_mismatch();
        bundle
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn label_encoder_loaded(&self) -> bool {
        self.label_decoder.is_some()
    }

    pub fn state(&self) -> ServiceState {
        if self.model_loaded() && self.label_encoder_loaded() {
            ServiceState::Ready
        } else {
            ServiceState::NotReady
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ServiceState::Ready
    }

    /// Cross-artifact checks; mismatches surface as prediction errors later.
    fn warn_on_mismatch(&self) {
        if let (Some(model), Some(scaler)) = (&self.classifier, &self.scaler) {
            if model.n_features() != scaler.n_features() {
                tracing::warn!(
                    "{} expects {} features but {} was fitted on {}",
                    model.name(),
                    model.n_features(),
                    scaler.name(),
                    scaler.n_features()
                );
            }
        }

        let known = self.label_decoder.as_ref().and_then(LabelDecoder::classes).map(<[String]>::len);
        if let (Some(model), Some(known)) = (&self.classifier, known) {
            let unseen: Vec<i64> = model
                .classes()
                .iter()
                .copied()
                .filter(|&c| usize::try_from(c).map_or(true, |i| i >= known))
                .collect();
            if !unseen.is_empty() {
                tracing::warn!("Model classes {:?} have no label in the label encoder", unseen);
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn load_artifact<F, T, B>(path: &Path, label: &str, required: bool, build: B) -> Option<T>
where
    F: DeserializeOwned,
    B: FnOnce(F) -> Result<T, ArtifactError>,
{
    if !path.exists() {
        if required {
            tracing::warn!("✗ {} file not found: {}", label, path.display());
        } else {
            tracing::info!("  (Optional) {} not found: {}", label, path.display());
        }
        return None;
    }

    match read_json::<F>(path).and_then(build) {
        Ok(artifact) => {
            tracing::info!("✓ Loaded {} from {}", label.to_lowercase(), path.display());
            Some(artifact)
        }
        Err(e) => {
            tracing::error!("✗ {} could not be loaded: {}", label, e);
            None
        }
    }
}
