mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use examprep_backend::{
    middleware::auth::{require_bearer_auth, require_expert},
    routes,
    services::{
        question_source::PgQuestionBank, result_recorder::PgResultRecorder,
        tutor_service::TutorService,
    },
    AppState,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{init_test_config, lazy_pool, live_pool, read_json, token_for};

fn app(pool: PgPool) -> Router {
    init_test_config();
    let state = AppState::with_backends(
        pool.clone(),
        Arc::new(PgQuestionBank::new(pool.clone(), 10)),
        Arc::new(PgResultRecorder::new(pool)),
        TutorService::new(None, reqwest::Client::new()),
    );

    let learner = Router::new()
        .route("/api/videos", get(routes::content::list_videos))
        .route(
            "/api/videos/:id/bookmark",
            put(routes::content::add_bookmark).delete(routes::content::remove_bookmark),
        )
        .layer(from_fn(require_bearer_auth));
    let expert = Router::new()
        .route("/api/expert/materials", post(routes::content::create_material))
        .route("/api/expert/materials/:id", delete(routes::content::delete_material))
        .route("/api/expert/videos", post(routes::content::create_video))
        .route("/api/expert/videos/preview", post(routes::content::preview_video))
        .route("/api/expert/videos/:id", delete(routes::content::delete_video))
        .route("/api/expert/stats", get(routes::content::stats))
        .layer(from_fn(require_expert));

    Router::new()
        .route("/api/materials", get(routes::content::list_materials))
        .route("/api/pyp", get(routes::content::list_pyp))
        .merge(learner)
        .merge(expert)
        .with_state(state)
}

async fn send(app: &Router, method: &str, uri: &str, auth: Option<&str>, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    let body = match body {
        Some(b) => {
            builder = builder.header("content-type", "application/json");
            Body::from(b.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    if status == StatusCode::NO_CONTENT {
        return (status, JsonValue::Null);
    }
    (status, read_json(resp).await)
}

#[tokio::test]
async fn video_preview_uses_the_player_rule() {
    let app = app(lazy_pool());
    let expert = token_for(Uuid::new_v4(), "expert");

    for link in [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "https://youtu.be/dQw4w9WgXcQ",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
    ] {
        let (status, body) = send(&app, "POST", "/api/expert/videos/preview", Some(expert.as_str()), Some(json!({ "video_url": link }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["embed_url"], "https://www.youtube.com/embed/dQw4w9WgXcQ");
    }

    let (status, _) = send(&app, "POST", "/api/expert/videos/preview", Some(expert.as_str()), Some(json!({ "video_url": "hello world" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expert_routes_reject_students_and_anonymous_callers() {
    let app = app(lazy_pool());
    let student = token_for(Uuid::new_v4(), "student");
    let body = json!({ "video_url": "https://youtu.be/dQw4w9WgXcQ" });

    let (status, _) = send(&app, "POST", "/api/expert/videos/preview", Some(student.as_str()), Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "POST", "/api/expert/videos/preview", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin = token_for(Uuid::new_v4(), "admin");
    let (status, _) = send(&app, "POST", "/api/expert/videos/preview", Some(admin.as_str()), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unplayable_video_is_refused_before_touching_storage() {
    let app = app(lazy_pool());
    let expert = token_for(Uuid::new_v4(), "expert");
    let payload = json!({
        "title": "Monsoon systems",
        "category": "prelims",
        "subject": "Geography",
        "video_url": "https://example.com/monsoon.mp4"
    });
    let (status, _) = send(&app, "POST", "/api/expert/videos", Some(expert.as_str()), Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn material_payload_is_validated() {
    let app = app(lazy_pool());
    let expert = token_for(Uuid::new_v4(), "expert");
    let (status, _) = send(
        &app,
        "POST",
        "/api/expert/materials",
        Some(expert.as_str()),
        Some(json!({
            "title": "",
            "category": "prelims",
            "subject": "Indian Polity",
            "file_url": "not a url"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn content_lifecycle_against_database() {
    let Some(pool) = live_pool().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let app = app(pool.clone());
    let expert_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, full_name, email, role) VALUES ($1, $2, $3, 'expert')")
        .bind(expert_id)
        .bind("Content Expert")
        .bind(format!("expert_{}@example.com", expert_id))
        .execute(&pool)
        .await
        .expect("seed expert");
    let expert = token_for(expert_id, "expert");
    let student = token_for(Uuid::new_v4(), "student");
    let category = format!("cat-{}", Uuid::new_v4().simple());

    let (status, material) = send(&app, "POST", "/api/expert/materials", Some(expert.as_str()), Some(json!({
        "title": "Polity syllabus",
        "category": category,
        "subject": "Indian Polity",
        "content_type": "syllabus",
        "file_url": "https://files.example.com/materials/polity.pdf"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let material_id = material["id"].as_i64().unwrap();

    let (status, listed) = send(&app, "GET", &format!("/api/materials?type=syllabus&category={}", category), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "POST", "/api/expert/materials", Some(expert.as_str()), Some(json!({
        "title": "GPSC prelims paper",
        "category": category,
        "subject": "Indian Polity",
        "content_type": "pyp",
        "file_url": "https://files.example.com/materials/pyp.pdf"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, video) = send(&app, "POST", "/api/expert/videos", Some(expert.as_str()), Some(json!({
        "title": "Rivers of Gujarat",
        "category": category,
        "subject": "Geography",
        "video_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=5"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(video["embed_url"], "https://www.youtube.com/embed/dQw4w9WgXcQ");
    let video_id = video["id"].as_i64().unwrap();

    let bookmark = format!("/api/videos/{}/bookmark", video_id);
    assert_eq!(send(&app, "PUT", &bookmark, Some(student.as_str()), None).await.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, "PUT", &bookmark, Some(student.as_str()), None).await.0, StatusCode::NO_CONTENT);

    let (_, saved) = send(&app, "GET", &format!("/api/videos?category={}&saved=true", category), Some(student.as_str()), None).await;
    let saved = saved.as_array().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["bookmarked"], true);

    assert_eq!(send(&app, "DELETE", &bookmark, Some(student.as_str()), None).await.0, StatusCode::NO_CONTENT);
    let (_, saved) = send(&app, "GET", &format!("/api/videos?category={}&saved=true", category), Some(student.as_str()), None).await;
    assert!(saved.as_array().unwrap().is_empty());

    let (status, stats) = send(&app, "GET", "/api/expert/stats", Some(expert.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats["videos"].as_i64().unwrap() >= 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/expert/videos/{}", video_id), Some(expert.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/api/expert/materials/{}", material_id), Some(expert.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/api/expert/materials/{}", material_id), Some(expert.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
