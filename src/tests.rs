//! Router tests: full request/response cycle through `create_router`.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

use crate::artifacts::{fixtures, ArtifactBundle, LABEL_ENCODER_FILE, MODEL_FILE, SCALER_FILE};
use crate::handlers::predict::PredictResponse;
use crate::{create_router, AppState};

fn app(bundle: ArtifactBundle) -> Router {
    create_router(AppState::new(bundle))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_predict(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_without_artifacts() {
    let (status, body) = send(app(ArtifactBundle::default()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ok", "model_loaded": false, "label_encoder_loaded": false })
    );
}

#[tokio::test]
async fn test_health_after_load() {
    let dir = tempdir().unwrap();
    fixtures::write(dir.path(), MODEL_FILE, &fixtures::svc_json());
    fixtures::write(dir.path(), LABEL_ENCODER_FILE, &fixtures::encoder_json());

    let (status, body) = send(app(ArtifactBundle::load(dir.path())), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["label_encoder_loaded"], true);
}

#[tokio::test]
async fn test_predict_zero_vector() {
    let (status, body) = send(
        app(fixtures::ready_bundle()),
        post_predict(json!({ "features": vec![0.0; 63] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response: PredictResponse = serde_json::from_value(body).unwrap();
    assert!(fixtures::LETTERS.contains(&response.prediction.as_str()));
    let confidence = response.confidence.unwrap();
    assert!((0.0..=1.0).contains(&confidence));
    assert!((confidence - 0.659).abs() < 1e-3);
}

#[tokio::test]
async fn test_predict_wrong_lengths() {
    for len in [0usize, 62, 64] {
        let (status, body) = send(
            app(fixtures::ready_bundle()),
            post_predict(json!({ "features": vec![0.5; len] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], format!("Expected 63 features, got {}", len));
        assert_eq!(body["status"], 400);
    }
}

#[tokio::test]
async fn test_predict_without_artifacts() {
    let (status, body) = send(
        app(ArtifactBundle::default()),
        post_predict(json!({ "features": vec![0.0; 63] })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Model not loaded. Please check server logs.");
}

#[tokio::test]
async fn test_predict_without_label_encoder() {
    let bundle = ArtifactBundle::new(Some(fixtures::classifier(fixtures::svc_json())), None, None);
    let (status, body) = send(app(bundle), post_predict(json!({ "features": vec![0.0; 63] }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Label encoder not loaded. Please check server logs.");
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_predict_with_scaler_loaded_from_disk() {
    let dir = tempdir().unwrap();
    fixtures::write(dir.path(), MODEL_FILE, &fixtures::svc_json());
    fixtures::write(dir.path(), LABEL_ENCODER_FILE, &fixtures::encoder_json());
    // Shifts feature 2 by +1, so an all-zero row lands on "C" instead of "A".
    let mut mean = vec![0.0; 63];
    mean[2] = -1.0;
    fixtures::write(
        dir.path(),
        SCALER_FILE,
        &json!({ "kind": "standard", "mean": mean, "scale": vec![1.0; 63] }),
    );

    let bundle = ArtifactBundle::load(dir.path());
    assert!(bundle.scaler.is_some());

    let (status, body) = send(app(bundle), post_predict(json!({ "features": vec![0.0; 63] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "C");
}

#[tokio::test]
async fn test_predict_malformed_bodies_use_json_errors() {
    for payload in [json!({}), json!({ "features": "x" }), json!({ "features": [0.0, "a"] })] {
        let (status, body) = send(app(fixtures::ready_bundle()), post_predict(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], 422);
        assert!(body["detail"].is_string());
    }

    let (_, body) = send(app(fixtures::ready_bundle()), post_predict(json!({}))).await;
    assert!(body["detail"].as_str().unwrap().contains("missing field `features`"));
}

#[tokio::test]
async fn test_predict_non_json_body() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(app(fixtures::ready_bundle()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["detail"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .body(Body::from(json!({ "features": vec![0.0; 63] }).to_string()))
        .unwrap();
    let (status, body) = send(app(fixtures::ready_bundle()), request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["status"], 415);
}

#[tokio::test]
async fn test_predict_internal_failure_carries_cause() {
    let short = fixtures::label_encoder(vec!["A".to_string()]).unwrap();
    let bundle = ArtifactBundle::new(Some(fixtures::classifier(fixtures::svc_json())), Some(short), None);

    let mut features = vec![0.0; 63];
    features[2] = 1.0;
    let (status, body) = send(app(bundle), post_predict(json!({ "features": features }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["detail"],
        "Prediction error: y contains previously unseen labels: [2]"
    );
}

#[tokio::test]
async fn test_root_describes_api() {
    let (status, body) = send(app(ArtifactBundle::default()), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Sign Language Prediction API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["endpoints"]["POST /predict"].is_string());
    assert!(body["endpoints"]["GET /health"].is_string());
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin_with_credentials() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, "http://10.0.2.2:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app(ArtifactBundle::default()).oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://10.0.2.2:3000");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type");
}
