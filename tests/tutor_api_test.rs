mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn,
    routing::post,
    Router,
};
use examprep_backend::{
    middleware::auth::require_bearer_auth,
    routes,
    services::{
        question_source::PgQuestionBank, result_recorder::PgResultRecorder,
        tutor_service::TutorService,
    },
    AppState,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use common::{init_test_config, lazy_pool, read_json, token_for};

fn app(tutor_url: Option<String>) -> Router {
    init_test_config();
    let pool = lazy_pool();
    let state = AppState::with_backends(
        pool.clone(),
        Arc::new(PgQuestionBank::new(pool.clone(), 10)),
        Arc::new(PgResultRecorder::new(pool)),
        TutorService::new(tutor_url, reqwest::Client::new()),
    );
    Router::new()
        .route("/api/ai/ask", post(routes::tutor::ask))
        .layer(from_fn(require_bearer_auth))
        .with_state(state)
}

async fn ask(app: Router, query: &str) -> axum::response::Response {
    let req = Request::builder()
        .method("POST")
        .uri("/api/ai/ask")
        .header("authorization", token_for(Uuid::new_v4(), "student"))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap();
    app.oneshot(req).await.unwrap()
}

#[tokio::test]
async fn answer_is_relayed_from_the_ai_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/ask"))
        .and(body_json(json!({ "query": "Who drafted the Indian constitution?" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "answer": "B. R. Ambedkar chaired the drafting committee." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = ask(app(Some(format!("{}/", server.uri()))), "  Who drafted the Indian constitution?  ").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["answer"], "B. R. Ambedkar chaired the drafting committee.");
}

#[tokio::test]
async fn upstream_rate_limit_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/ask"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let resp = ask(app(Some(server.uri())), "Explain the Narmada dam dispute").await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/ask"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let resp = ask(app(Some(server.uri())), "What is GDP deflator?").await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn unconfigured_tutor_and_blank_questions() {
    let resp = ask(app(None), "Anything").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let resp = ask(app(None), "   ").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = ask(app(None), "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
