//! In-process tests for the HTTP API

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use spam_core::{train_artifact, Label, ModelArtifact, SpamThreshold};
use spam_server::{router, AppState, ModelHandle};
use std::sync::Arc;
use tower::ServiceExt;

fn app(state: AppState) -> (Router, Arc<AppState>) {
    let state = Arc::new(state);
    (router(state.clone()), state)
}

fn untrained() -> AppState {
    AppState::new(ModelHandle::new(), SpamThreshold::default())
}

fn train_body() -> Value {
    json!({
        "emails": [
            "Urgent! You've won a free iPhone. Click here now!",
            "Meeting scheduled for project review next week",
            "Get rich quick with this amazing investment opportunity!",
            "Quarterly team performance report attached",
            "Limited time offer: Massive discount on luxury watches!",
            "Client proposal for Q3 marketing strategy",
            "Congratulations! You're selected for a free cruise!",
            "Weekly team sync-up agenda and discussion points"
        ],
        "labels": [
            "spam", "not_spam", "spam", "not_spam",
            "spam", "not_spam", "spam", "not_spam"
        ]
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(untrained());
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_predict_before_training_is_500() {
    let (app, _) = app(untrained());
    let (status, body) = send(
        &app,
        "POST",
        "/predict",
        Some(json!({ "email_text": "free money" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not trained"));
}

#[tokio::test]
async fn test_train_then_predict() {
    let (app, state) = app(untrained());

    let (status, report) = send(&app, "POST", "/train", Some(train_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_samples"], 8);
    assert_eq!(report["class_counts"]["spam"], 4);
    assert!(state.model.is_loaded().await);

    let (status, body) = send(
        &app,
        "POST",
        "/predict",
        Some(json!({ "email_text": "Congratulations! You've won a free vacation!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "spam");

    let spam = body["spam_probability"].as_f64().unwrap();
    let not_spam = body["not_spam_probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&spam));
    assert!((spam + not_spam - 1.0).abs() < 1e-9);
    assert_eq!(body["is_spam"], spam > 0.7);

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["model_loaded"], true);
    assert!(health["vocab_size"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_missing_email_text_defaults_to_empty() {
    let (artifact, _) = train_artifact(
        &["free money now", "project meeting notes"],
        &[Label::Spam, Label::NotSpam],
        false,
    )
    .unwrap();
    let (app, _) = app(AppState::new(
        ModelHandle::with_model(artifact),
        SpamThreshold::default(),
    ));

    let (status, body) = send(&app, "POST", "/predict", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "not_spam");
    assert_eq!(body["is_spam"], false);
    assert_eq!(body["message"], "Not spam.");
}

#[tokio::test]
async fn test_threshold_decides_is_spam() {
    let (artifact, _) = train_artifact(
        &["free money now", "project meeting notes"],
        &[Label::Spam, Label::NotSpam],
        false,
    )
    .unwrap();
    let (app, _) = app(AppState::new(
        ModelHandle::with_model(artifact),
        SpamThreshold::new(0.0).unwrap(),
    ));

    let (_, body) = send(&app, "POST", "/predict", Some(json!({ "email_text": "free" }))).await;
    assert_eq!(body["label"], "spam");
    assert_eq!(body["is_spam"], true);
    assert_eq!(body["message"], "Spam detected!");
}

#[tokio::test]
async fn test_unknown_label_is_400() {
    let (app, state) = app(untrained());
    let (status, body) = send(
        &app,
        "POST",
        "/train",
        Some(json!({ "emails": ["a b", "c d"], "labels": ["spam", "ham"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ham"));
    assert!(!state.model.is_loaded().await);
}

#[tokio::test]
async fn test_single_class_training_is_422_and_keeps_model() {
    let (app, state) = app(untrained());
    send(&app, "POST", "/train", Some(train_body())).await;
    let before = state.model.current().await.unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/train",
        Some(json!({ "emails": ["win cash", "free prize"], "labels": ["spam", "spam"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let after = state.model.current().await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn test_train_persists_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spam_model.json");
    let (app, state) = app(untrained().with_persist_path(&path));

    let (status, _) = send(&app, "POST", "/train", Some(train_body())).await;
    assert_eq!(status, StatusCode::OK);

    let saved = ModelArtifact::load_json(&path).unwrap();
    let live = state.model.current().await.unwrap();
    assert_eq!(&saved, live.as_ref());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_training_keeps_file_and_model_in_sync() {
    const WORDS: [&str; 8] = [
        "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
    ];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spam_model.json");
    let (app, state) = app(untrained().with_persist_path(&path));

    for _ in 0..25 {
        let requests = WORDS.iter().map(|word| {
            let app = app.clone();
            let body = json!({
                "emails": [
                    format!("claim your {} prize now", word),
                    "project meeting notes",
                    format!("free {} money", word),
                    "quarterly report attached"
                ],
                "labels": ["spam", "not_spam", "spam", "not_spam"]
            });
            tokio::spawn(async move { send(&app, "POST", "/train", Some(body)).await.0 })
        });

        for request in requests.collect::<Vec<_>>() {
            assert_eq!(request.await.unwrap(), StatusCode::OK);
        }

        let saved = ModelArtifact::load_json(&path).unwrap();
        let live = state.model.current().await.unwrap();
        assert_eq!(&saved, live.as_ref());
    }
}
