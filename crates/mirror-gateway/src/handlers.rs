use crate::{AppState, VERSION};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mirror_core::ToolDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct ProcessParams {
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    detailed: Option<String>,
}

impl ProcessParams {
    fn input(&self) -> Option<&str> {
        self.input.as_deref().filter(|s| !s.is_empty())
    }

    fn detailed(&self) -> bool {
        self.detailed.as_deref() == Some("true")
    }
}

#[derive(Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDescriptor>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub llm_available: bool,
    pub environment: String,
    pub tools_count: usize,
    pub version: &'static str,
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub async fn health() -> &'static str {
    tracing::debug!("health check");
    "OK"
}

pub async fn process(State(state): State<AppState>, Query(params): Query<ProcessParams>) -> Response {
    let started = Instant::now();
    let Some(input) = params.input() else {
        tracing::warn!("empty input received");
        return error_json(StatusCode::BAD_REQUEST, "Missing 'input' parameter");
    };
    let detailed = params.detailed();
    tracing::info!(input_len = input.len(), detailed, "processing user input");

    if detailed {
        match state.orchestrator.process_detailed(input).await {
            Ok(resp) => {
                tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "detailed processing completed");
                Json(resp).into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "detailed processing failed");
                error_json(StatusCode::INTERNAL_SERVER_ERROR, "Processing failed")
            }
        }
    } else {
        match state.orchestrator.process(input).await {
            Ok(text) => {
                tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "processing completed");
                text.into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "processing failed");
                error_json(StatusCode::INTERNAL_SERVER_ERROR, "Processing failed")
            }
        }
    }
}

/// `{"response": ..., "status": "success"}` envelope used before the v1 routes.
pub async fn legacy_process(State(state): State<AppState>, Query(params): Query<ProcessParams>) -> Response {
    let Some(input) = params.input() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "input is required", "status": "error" })),
        )
            .into_response();
    };
    match state.orchestrator.process(input).await {
        Ok(text) => Json(json!({ "response": text, "status": "success" })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Processing failed", "status": "error" })),
            )
                .into_response()
        }
    }
}

pub async fn profile(State(state): State<AppState>) -> Response {
    match state.orchestrator.profile().read().await {
        Ok(text) => {
            tracing::debug!(profile_length = text.len(), "profile retrieved");
            text.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to get profile");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get profile")
        }
    }
}

pub async fn tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    let tools = state.orchestrator.registry().descriptors();
    tracing::info!(tools_count = tools.len(), "tools list generated");
    let body = ToolsResponse {
        count: tools.len(),
        tools,
    };
    Json(body)
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let orch = &state.orchestrator;
    let body = StatusResponse {
        status: "healthy",
        llm_available: orch.llm_available(),
        environment: orch.environment().to_string(),
        tools_count: orch.registry().len(),
        version: VERSION,
    };
    tracing::info!(tools_count = body.tools_count, llm_available = body.llm_available, "status check");
    Json(body)
}

#[cfg(test)]
mod tests {
    use crate::{build_app, AppState};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use mirror_core::{
        ExecutionError, InMemoryProfile, Orchestrator, ProfileStore, ProfileWrite,
        SelectionService, StoreError, Tool, ToolRegistry, PROFILE_HEADER,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(registry: ToolRegistry, profile: Arc<dyn ProfileStore>) -> axum::Router {
        let orch = Orchestrator::new(
            Arc::new(registry),
            profile,
            Arc::new(SelectionService::fallback_only()),
        )
        .with_environment("test");
        build_app(AppState::new(orch))
    }

    fn app() -> axum::Router {
        app_with(ToolRegistry::with_builtin_tools(), Arc::new(InMemoryProfile::new()))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(get(app(), "/health").await, (StatusCode::OK, "OK".to_string()));
    }

    #[tokio::test]
    async fn process_returns_plain_text() {
        let (status, body) = get(app(), "/api/v1/process?input=hi").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Processed with 1 tools: echo: Echo: hi");
    }

    #[tokio::test]
    async fn process_without_input_is_bad_request() {
        for uri in ["/api/v1/process", "/api/v1/process?input="] {
            let (status, body) = get(app(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json(&body)["error"], "Missing 'input' parameter");
        }
    }

    #[tokio::test]
    async fn process_detailed_returns_json() {
        let (status, body) = get(app(), "/api/v1/process?input=hello%20there&detailed=true").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["input"], "hello there");
        assert_eq!(v["result"]["final_response"], "Processed with 1 tools: echo: Echo: hello there");
        assert_eq!(v["result"]["metadata"]["environment"], "test");
        assert_eq!(v["result"]["processing_details"]["selection"]["used_fallback"], true);
    }

    #[tokio::test]
    async fn selection_failure_is_opaque_500() {
        struct Unnamed;
        #[async_trait::async_trait]
        impl Tool for Unnamed {
            fn name(&self) -> &str {
                " "
            }
            fn description(&self) -> &str {
                ""
            }
            async fn execute(&self, _input: &str) -> Result<String, ExecutionError> {
                Ok(String::new())
            }
        }
        let registry = ToolRegistry::new();
        registry.register(Arc::new(Unnamed));
        let app = app_with(registry, Arc::new(InMemoryProfile::new()));

        let (status, body) = get(app.clone(), "/api/v1/process?input=x").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body), serde_json::json!({ "error": "Processing failed" }));

        let (status, body) = get(app, "/process?input=x").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body)["status"], "error");
    }

    #[tokio::test]
    async fn profile_reflects_processed_input() {
        let app = app();
        get(app.clone(), "/api/v1/process?input=first").await;

        let req = Request::builder().uri("/api/v1/profile").body(Body::empty()).unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let content_type = res.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"));

        let (_, body) = get(app, "/profile").await;
        assert_eq!(body, format!("{}• first\n", PROFILE_HEADER));
    }

    #[tokio::test]
    async fn profile_store_error_is_500() {
        struct Down;
        #[async_trait::async_trait]
        impl ProfileStore for Down {
            async fn read(&self) -> Result<String, StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }
            async fn append(&self, _entry: &str) -> Result<ProfileWrite, StoreError> {
                Err(StoreError::Unavailable("down".into()))
            }
        }
        let (status, body) = get(app_with(ToolRegistry::new(), Arc::new(Down)), "/api/v1/profile").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body)["error"], "Failed to get profile");
    }

    #[tokio::test]
    async fn tools_lists_descriptors() {
        let (status, body) = get(app(), "/api/v1/tools").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["count"], 2);
        assert_eq!(v["tools"][0]["name"], "echo");
        assert_eq!(v["tools"][1]["name"], "time");
    }

    #[tokio::test]
    async fn status_reports_fallback_mode() {
        let (status, body) = get(app(), "/api/v1/status").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["status"], "healthy");
        assert_eq!(v["llm_available"], false);
        assert_eq!(v["environment"], "test");
        assert_eq!(v["tools_count"], 2);
        assert_eq!(v["version"], crate::VERSION);
    }

    #[tokio::test]
    async fn legacy_process_wraps_response() {
        let (status, body) = get(app(), "/process?input=hi").await;
        assert_eq!(status, StatusCode::OK);
        let v = json(&body);
        assert_eq!(v["response"], "Processed with 1 tools: echo: Echo: hi");
        assert_eq!(v["status"], "success");
    }
}
