//! Label decoder: class index → human readable letter

use serde::Deserialize;

use crate::error::{ArtifactError, InferenceError};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelDecoder {
    /// Fitted label encoder; index `i` maps to `classes[i]`
    LabelEncoder { classes: Vec<String> },
    /// No inverse mapping, the raw index is the label
    Passthrough,
}

impl LabelDecoder {
    pub(crate) fn validated(self) -> Result<Self, ArtifactError> {
        if let LabelDecoder::LabelEncoder { classes } = &self {
            if classes.is_empty() {
                return Err(ArtifactError::Invalid("label encoder has no classes".to_string()));
            }
        }
        Ok(self)
    }

    pub fn supports_inverse(&self) -> bool {
        matches!(self, LabelDecoder::LabelEncoder { .. })
    }

    pub fn classes(&self) -> Option<&[String]> {
        match self {
            LabelDecoder::LabelEncoder { classes } => Some(classes),
            LabelDecoder::Passthrough => None,
        }
    }

    pub fn decode(&self, index: i64) -> Result<String, InferenceError> {
        match self {
            LabelDecoder::LabelEncoder { classes } => usize::try_from(index)
                .ok()
                .and_then(|i| classes.get(i))
                .cloned()
                .ok_or(InferenceError::UnseenLabel(index)),
            LabelDecoder::Passthrough => Ok(index.to_string()),
        }
    }
}
