//! HTTP API gateway for Pagewright.
//!
//! Exposes the edit pipeline over REST: free-text edits, explicit batches,
//! direct validation and a dry-run classifier, plus a health check.
//! Pipeline failures are reported inside the JSON envelope with status 200;
//! only malformed requests are rejected at the HTTP level.
//!
//! Built on Axum.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use pagewright_agent::PageAgent;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: Arc<PageAgent>,
    pub model: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(agent: Arc<PageAgent>, model: impl Into<String>) -> Self {
        Self {
            agent,
            model: model.into(),
            start_time: chrono::Utc::now(),
        }
    }
}

/// Build the full router: `/health` plus the v1 API.
///
/// Layers applied:
/// - CORS for local development servers
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ]))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: pagewright_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let agent = Arc::new(PageAgent::from_config(&config)?);
    let state = Arc::new(GatewayState::new(agent, &config.default_model));
    let app = build_router(state);

    info!(
        addr = %addr,
        root = %config.project.root,
        model = %config.default_model,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
    tools: Vec<String>,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model: state.model.clone(),
        tools: state.agent.tools(),
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
    })
}
