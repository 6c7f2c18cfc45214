//! Prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{inference, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// `[x1, y1, z1, ..., x21, y21, z21]`
    pub features: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: Option<f64>,
}

/// Predict the letter signed by a hand from its 63 landmark coordinates
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(req) = payload?;
    let result = inference::predict(&state.artifacts, &req.features)?;

    tracing::debug!(
        "Predicted {} (confidence {:?})",
        result.label,
        result.confidence
    );

    Ok(Json(PredictResponse {
        prediction: result.label,
        confidence: result.confidence,
    }))
}
