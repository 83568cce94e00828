use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use examprep_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    middleware::{auth, cors::cors_layer, rate_limit::RateLimiter},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    let app_state = AppState::new(pool);
    info!(question_source = ?config.question_source, "application state ready");

    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/quiz/topics", get(routes::quiz::list_topics))
        .route("/api/materials", get(routes::content::list_materials))
        .route("/api/pyp", get(routes::content::list_pyp));

    let learner_api = Router::new()
        .route("/api/quiz/sessions", post(routes::quiz::create_session))
        .route(
            "/api/quiz/sessions/:id",
            get(routes::quiz::get_session).delete(routes::quiz::abandon),
        )
        .route("/api/quiz/sessions/:id/topic", post(routes::quiz::select_topic))
        .route("/api/quiz/sessions/:id/answer", post(routes::quiz::submit_answer))
        .route("/api/quiz/sessions/:id/advance", post(routes::quiz::advance))
        .route("/api/quiz/sessions/:id/restart", post(routes::quiz::restart))
        .route("/api/quiz/results", get(routes::quiz::list_results))
        .route("/api/videos", get(routes::content::list_videos))
        .route(
            "/api/videos/:id/bookmark",
            put(routes::content::add_bookmark).delete(routes::content::remove_bookmark),
        )
        .route("/api/ai/ask", post(routes::tutor::ask))
        .route("/api/user/:id", get(routes::users::get_profile))
        .layer(from_fn(auth::require_bearer_auth));

    let expert_api = Router::new()
        .route("/api/expert/materials", post(routes::content::create_material))
        .route(
            "/api/expert/materials/:id",
            delete(routes::content::delete_material),
        )
        .route("/api/expert/videos", post(routes::content::create_video))
        .route(
            "/api/expert/videos/preview",
            post(routes::content::preview_video),
        )
        .route("/api/expert/videos/:id", delete(routes::content::delete_video))
        .route("/api/expert/students", get(routes::users::list_students))
        .route("/api/expert/stats", get(routes::content::stats))
        .layer(from_fn(auth::require_expert));

    let admin_api = Router::new()
        .route("/api/admin/promote-user", post(routes::users::promote_user))
        .layer(from_fn(auth::require_admin));

    let app = Router::new()
        .merge(public_api)
        .merge(learner_api)
        .merge(expert_api)
        .merge(admin_api)
        .layer(from_fn_with_state(
            RateLimiter::new(config.public_rps),
            examprep_backend::middleware::rate_limit::rps_middleware,
        ))
        .layer(cors_layer(config.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = TcpListener::bind(&config.server_address).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
