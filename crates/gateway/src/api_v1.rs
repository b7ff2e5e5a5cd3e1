//! HTTP API v1: the edit pipeline over REST.
//!
//! Endpoints:
//!
//! - `GET  /v1/components`: Known component identifiers
//! - `POST /v1/edit`: Handle a free-text instruction
//! - `POST /v1/batch`: Run explicit decisions in order
//! - `POST /v1/validate`: Run the self-healing validator on a component
//! - `POST /v1/classify`: Dry-run classification, nothing is changed

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::SharedState;
use pagewright_core::{AgentError, AgentResponse, EditRequest, SequentialResult, ToolDecision};

/// Build the v1 router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/components", get(list_components_handler))
        .route("/edit", post(edit_handler))
        .route("/batch", post(batch_handler))
        .route("/validate", post(validate_handler))
        .route("/classify", post(classify_handler))
        .with_state(state)
}

fn error_body(err: &AgentError) -> Value {
    json!({
        "success": false,
        "error": err.to_string(),
        "errorKind": err.kind(),
        "suggestions": err.suggestions(),
    })
}

// ── Components ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentListResponse {
    pub success: bool,
    pub components: Vec<String>,
    pub count: usize,
}

async fn list_components_handler(State(state): State<SharedState>) -> Json<Value> {
    match state.agent.known_targets().await {
        Ok(components) => Json(json!(ComponentListResponse {
            success: true,
            count: components.len(),
            components,
        })),
        Err(err) => Json(error_body(&err)),
    }
}

// ── Edit ──────────────────────────────────────────────────────────────────

async fn edit_handler(
    State(state): State<SharedState>,
    Json(request): Json<EditRequest>,
) -> Json<AgentResponse> {
    let request_id = uuid::Uuid::new_v4();
    info!(request_id = %request_id, prompt_len = request.prompt.len(), "Edit request");
    let response = state.agent.handle(request).await;
    info!(
        request_id = %request_id,
        success = response.success,
        tool = response.tool.as_deref().unwrap_or("-"),
        "Edit request finished"
    );
    Json(response)
}

// ── Batch ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub decisions: Vec<ToolDecision>,
    #[serde(default)]
    pub soft_fail: Option<bool>,
}

async fn batch_handler(
    State(state): State<SharedState>,
    Json(request): Json<BatchRequest>,
) -> Json<SequentialResult> {
    info!(operations = request.decisions.len(), "Batch request");
    Json(
        state
            .agent
            .handle_batch(request.decisions, request.soft_fail)
            .await,
    )
}

// ── Validate ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub component: String,
    #[serde(default)]
    pub soft_fail: bool,
}

async fn validate_handler(
    State(state): State<SharedState>,
    Json(request): Json<ValidateRequest>,
) -> Json<Value> {
    match state
        .agent
        .validate(&request.component, request.soft_fail)
        .await
    {
        Ok(report) => Json(json!({ "success": true, "report": report })),
        Err(err) => Json(error_body(&err)),
    }
}

// ── Classify ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub prompt: String,
    #[serde(default, alias = "knownTargets")]
    pub targets: Vec<String>,
}

async fn classify_handler(
    State(state): State<SharedState>,
    Json(request): Json<ClassifyRequest>,
) -> Json<Value> {
    match state.agent.classify(&request.prompt, request.targets).await {
        Ok(report) => Json(json!({ "success": true, "classification": report })),
        Err(err) => Json(error_body(&err)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GatewayState, build_router};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use pagewright_agent::PageAgent;
    use pagewright_config::AppConfig;
    use pagewright_core::testing::SequentialMockProvider;
    use pagewright_validator::testing::ScriptedChecker;
    use std::sync::Arc;
    use tower::ServiceExt;

    const HERO: &str = "export default function Hero() {\n  return <section className=\"bg-white\"><h1>Ship faster</h1></section>;\n}\n";
    const PAGE: &str = "import Hero from \"@/components/Hero\";\n\nexport default function Page() {\n  return (\n    <main>\n      <Hero />\n    </main>\n  );\n}\n";

    fn test_app(replies: &[&str]) -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/components")).unwrap();
        std::fs::create_dir_all(dir.path().join("src/app")).unwrap();
        std::fs::write(dir.path().join("src/components/Hero.tsx"), HERO).unwrap();
        std::fs::write(dir.path().join("src/app/page.tsx"), PAGE).unwrap();

        let mut config = AppConfig::default();
        config.project.root = dir.path().to_string_lossy().into_owned();
        let agent = PageAgent::from_parts(
            &config,
            Arc::new(SequentialMockProvider::texts(replies)),
            Arc::new(ScriptedChecker::always_pass()),
        );
        let state = Arc::new(GatewayState::new(Arc::new(agent), "mock-model"));
        (build_router(state), dir)
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_reports_tools() {
        let (app, _dir) = test_app(&[]);
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "mock-model");
        assert_eq!(json["tools"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn list_components() {
        let (app, _dir) = test_app(&[]);
        let req = Request::builder().uri("/v1/components").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let list: ComponentListResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.components, vec!["Hero".to_string()]);
        assert_eq!(list.count, 1);
    }

    #[tokio::test]
    async fn edit_applies_a_heuristic_decision() {
        let (app, dir) = test_app(&[]);
        let (status, json) = post_json(
            app,
            "/v1/edit",
            json!({"prompt": "hero: change the background color to indigo"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true, "{json}");
        assert_eq!(json["tool"], "color-update");
        let hero = std::fs::read_to_string(dir.path().join("src/components/Hero.tsx")).unwrap();
        assert!(hero.contains("bg-indigo-600"));
    }

    #[tokio::test]
    async fn pipeline_failure_is_still_http_200() {
        let (app, _dir) = test_app(&[]);
        let (status, json) = post_json(
            app,
            "/v1/edit",
            json!({"prompt": "use this picture in the hero"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert_eq!(json["errorKind"], "MissingAttachment");
    }

    #[tokio::test]
    async fn batch_reports_unknown_tool() {
        let (app, _dir) = test_app(&[]);
        let (status, json) = post_json(
            app,
            "/v1/batch",
            json!({"decisions": [{"tool": "not-a-real-tool", "confidence": 1.0, "reasoning": "", "instructions": {}}]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert_eq!(json["failures"][0]["operationIndex"], 1);
        assert!(json["failures"][0]["error"].as_str().unwrap().contains("UnknownTool"));
    }

    #[tokio::test]
    async fn validate_reports_pass_and_missing_component() {
        let (app, _dir) = test_app(&[]);
        let (_, json) = post_json(app, "/v1/validate", json!({"component": "Hero"})).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["report"]["status"], "pass");
        assert_eq!(json["report"]["checks"], 1);

        let (app, _dir) = test_app(&[]);
        let (_, json) = post_json(app, "/v1/validate", json!({"component": "Nope"})).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["errorKind"], "Document");
    }

    #[tokio::test]
    async fn classify_is_read_only() {
        let (app, dir) = test_app(&[]);
        let (_, json) = post_json(
            app,
            "/v1/classify",
            json!({"prompt": "delete the hero section"}),
        )
        .await;
        assert_eq!(json["success"], true);
        assert_eq!(json["classification"]["intent"], "DELETE");
        assert_eq!(json["classification"]["target"], "Hero");
        assert!(dir.path().join("src/components/Hero.tsx").exists());
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let (app, _dir) = test_app(&[]);
        let req = Request::builder()
            .method("POST")
            .uri("/v1/edit")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"not_prompt": 1}"#))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
    }
}
