//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Failures raised while running a feature row through the artifacts
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("X has {got} features, but {component} is expecting {expected} features as input")]
    FeatureWidth {
        expected: usize,
        got: usize,
        component: &'static str,
    },

    #[error("y contains previously unseen labels: [{0}]")]
    UnseenLabel(i64),

    #[error("{0}")]
    InvalidArtifact(String),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Failures raised while reading an artifact file at startup
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

#[derive(Debug)]
pub enum AppError {
    // Required artifact absent
    NotReady(String),

    // Body is not JSON, or not shaped like the request DTO
    MalformedBody { status: StatusCode, detail: String },

    // Wrong feature count
    InvalidInput { expected: usize, got: usize },

    // Anything failing between matrix construction and confidence
    Inference(InferenceError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MalformedBody { status, .. } => *status,
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            AppError::NotReady(msg) => msg.clone(),
            AppError::MalformedBody { detail, .. } => detail.clone(),
            AppError::InvalidInput { expected, got } => {
                format!("Expected {} features, got {}", expected, got)
            }
            AppError::Inference(err) => format!("Prediction error: {}", err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        match &self {
            AppError::Inference(_) => tracing::error!("{}", detail),
            AppError::NotReady(_) => tracing::warn!("Rejected prediction: {}", detail),
            AppError::MalformedBody { .. } | AppError::InvalidInput { .. } => {
                tracing::debug!("Rejected prediction: {}", detail)
            }
        }

        let body = Json(json!({
            "detail": detail,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::Inference(err)
    }
}
