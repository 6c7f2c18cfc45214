//! API information handler

use axum::Json;
use serde_json::{json, Value};

use crate::inference::FEATURE_COUNT;

pub const API_NAME: &str = "Sign Language Prediction API";

pub async fn info() -> Json<Value> {
    Json(json!({
        "name": API_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /predict": "Predict letter from hand landmarks",
            "GET /health": "Check server and model status"
        },
        "usage": {
            "features": format!("Send {} values [x1,y1,z1,...,x21,y21,z21]", FEATURE_COUNT),
            "example": "POST /predict with {'features': [0.1, 0.2, ...]}"
        }
    }))
}
