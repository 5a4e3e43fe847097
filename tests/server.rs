use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use persuasion_lens::server::{create_router, AppState, ServerConfig};
use persuasion_lens::{AnalysisResponse, Analyzer};
use tower::ServiceExt;

fn test_router() -> Router {
    create_router(AppState::new(Analyzer::default()), &ServerConfig::default())
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_returns_200() {
    let resp = test_router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn index_serves_the_form() {
    let resp = test_router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<form"));
    assert!(html.contains("/analyze"));
}

#[tokio::test]
async fn analyze_returns_full_breakdown() {
    let text = "Hurry! Only today: this proven, amazing formula is trusted by millions.";
    let body = serde_json::json!({ "text": text }).to_string();
    let resp = test_router()
        .oneshot(post_json("/analyze", body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let result: AnalysisResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(result.original_text, text);
    assert_eq!(result.persuasive_keywords.count, 7);
    assert!(result.highlighted_text.contains("highlight-persuasive"));
    let direct = Analyzer::default().analyze(text).unwrap();
    assert_eq!(result.persuasion_score, direct.persuasion_score);
    assert_eq!(result.ethical_score, direct.ethical_score);
    assert_eq!(result.highlighted_text, direct.highlighted_text);
}

#[tokio::test]
async fn short_text_is_a_client_error() {
    let body = serde_json::json!({ "text": "  hi  " }).to_string();
    let resp = test_router()
        .oneshot(post_json("/analyze", body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(
        json["error"],
        "Please provide at least 10 characters of text."
    );
}

#[tokio::test]
async fn missing_text_field_is_treated_as_empty() {
    let resp = test_router()
        .oneshot(post_json("/analyze", "{}".to_string()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await.get("error").is_some());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let resp = test_router()
        .oneshot(post_json("/analyze", "{\"text\": ".to_string()))
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let config = ServerConfig {
        max_body_bytes: 128,
        ..ServerConfig::default()
    };
    let app = create_router(AppState::new(Analyzer::default()), &config);
    let body = serde_json::json!({ "text": "now ".repeat(200) }).to_string();
    let resp = app.oneshot(post_json("/analyze", body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
