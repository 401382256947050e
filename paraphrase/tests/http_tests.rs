//! HTTP boundary tests against an in-memory router
//!
//! Uses stub components so no model files are needed.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use paraphrase::http::{router, HealthResponse, PredictResponse};
use paraphrase::{
    DetectorConfig, DetectorError, EncodedPair, InferenceEngine, Label, PairEncoder,
    ParaphraseDetector,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const MAX_LENGTH: usize = 4;

/// Marks pairs of equal sentences with id 1, different ones with id 0
struct EqualityEncoder;

impl PairEncoder for EqualityEncoder {
    fn encode(&self, a: &str, b: &str) -> paraphrase_core::error::Result<EncodedPair> {
        if a.contains('\u{0}') || b.contains('\u{0}') {
            return Err(DetectorError::Encoding("NUL byte in input".to_string()));
        }
        let flag = i64::from(a.trim().eq_ignore_ascii_case(b.trim()));
        Ok(EncodedPair::new(vec![101, flag, 102, 0], vec![1, 1, 1, 0]).unwrap())
    }

    fn max_length(&self) -> usize {
        MAX_LENGTH
    }
}

/// Returns logits favouring `paraphrase` when the flag is set
struct FlagEngine;

impl InferenceEngine for FlagEngine {
    fn run(&self, batch: &[EncodedPair]) -> paraphrase_core::error::Result<Vec<Vec<f32>>> {
        Ok(batch
            .iter()
            .map(|pair| {
                if pair.input_ids()[1] == 1 {
                    vec![-1.0, 2.0]
                } else {
                    vec![1.5, -0.5]
                }
            })
            .collect())
    }

    fn num_labels(&self) -> usize {
        2
    }

    fn backend_name(&self) -> &str {
        "stub"
    }
}

/// Always fails at inference time
struct BrokenEngine;

impl InferenceEngine for BrokenEngine {
    fn run(&self, _batch: &[EncodedPair]) -> paraphrase_core::error::Result<Vec<Vec<f32>>> {
        Err(DetectorError::Inference("session crashed".to_string()))
    }

    fn num_labels(&self) -> usize {
        2
    }

    fn backend_name(&self) -> &str {
        "broken"
    }
}

fn app_with(engine: Arc<dyn InferenceEngine>, config: DetectorConfig) -> Router {
    let detector = ParaphraseDetector::new(Arc::new(EqualityEncoder), engine, config).unwrap();
    router(Arc::new(detector))
}

fn app() -> Router {
    app_with(Arc::new(FlagEngine), DetectorConfig::default())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_predict_paraphrase() {
    let (status, body) = get(app(), "/predict/?sentence1=Hello%20world!&sentence2=hello%20world!").await;

    assert_eq!(status, StatusCode::OK);
    let response: PredictResponse = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(response.sentence1, "Hello world!");
    assert_eq!(response.sentence2, "hello world!");
    assert_eq!(response.predicted_label, Label::Paraphrase);
    assert!(response.confidence > 0.5 && response.confidence <= 1.0);
    assert_eq!(body["predicted_label"], "paraphrase");
}

#[tokio::test]
async fn test_predict_not_paraphrase_without_trailing_slash() {
    let (status, body) = get(
        app(),
        "/predict?sentence1=The%20dog%20is%20sleeping.&sentence2=The%20cat%20is%20playing.",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_label"], "not_paraphrase");
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 4);
    for key in ["sentence1", "sentence2", "predicted_label", "confidence"] {
        assert!(object.contains_key(key), "missing {key}");
    }
}

#[tokio::test]
async fn test_empty_sentences_are_accepted() {
    let (status, body) = get(app(), "/predict/?sentence1=&sentence2=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentence1"], "");
}

#[tokio::test]
async fn test_missing_parameter_is_bad_request() {
    let (status, body) = get(app(), "/predict/?sentence1=only%20one").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("sentence2"));
}

#[tokio::test]
async fn test_malformed_query_is_json_bad_request() {
    let (status, body) = get(app(), "/predict/?sentence1=a&sentence1=b&sentence2=c").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("duplicate field"), "unexpected detail: {detail}");
}

#[tokio::test]
async fn test_encoding_error_is_bad_request() {
    let (status, body) = get(app(), "/predict/?sentence1=a%00b&sentence2=c").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("Encoding failed"));
}

#[tokio::test]
async fn test_input_limit_is_bad_request() {
    let app = app_with(
        Arc::new(FlagEngine),
        DetectorConfig::default().with_max_input_chars(5),
    );
    let (status, body) = get(app, "/predict/?sentence1=too%20long%20here&sentence2=ok").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn test_engine_fault_is_internal_error() {
    let app = app_with(Arc::new(BrokenEngine), DetectorConfig::default());
    let (status, body) = get(app, "/predict/?sentence1=a&sentence2=b").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Inference failed: session crashed");
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.backend, "stub");
    assert_eq!(health.backend_info, "stub backend");
    assert_eq!(health.max_length, MAX_LENGTH);
    assert_eq!(health.version, paraphrase::VERSION);
}

#[tokio::test]
async fn test_concurrent_requests() {
    let app = app();
    let mut handles = vec![];

    for i in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let uri = if i % 2 == 0 {
                "/predict/?sentence1=same&sentence2=same"
            } else {
                "/predict/?sentence1=one&sentence2=two"
            };
            (i, get(app, uri).await)
        }));
    }

    for handle in handles {
        let (i, (status, body)) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let expected = if i % 2 == 0 { "paraphrase" } else { "not_paraphrase" };
        assert_eq!(body["predicted_label"], expected);
    }
}
