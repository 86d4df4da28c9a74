use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt as _;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use lantern_pipeline::{PipelineError, SearchChatPipeline};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SearchChatPipeline>,
}

/// Builds the application router.
///
/// CORS is fully permissive so browser front ends on any origin can call the
/// stream endpoint directly.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/search-chat", post(search_chat))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, serde::Deserialize)]
struct SearchChatRequest {
    #[serde(default)]
    query: String,
}

/// Starts one pipeline invocation and forwards its events as SSE frames.
///
/// Validation failures are rejected before the stream opens; everything after
/// the response status is committed travels inside the stream itself.
async fn search_chat(
    State(state): State<AppState>,
    Json(request): Json<SearchChatRequest>,
) -> Response {
    match state.pipeline.stream(request.query) {
        Ok(stream) => {
            let frames = stream.map(|event| Ok::<_, Infallible>(event.encode_frame()));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/event-stream"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                Body::from_stream(frames),
            )
                .into_response()
        }
        Err(PipelineError::EmptyQuery) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Query is required" })),
        )
            .into_response(),
        Err(error) => {
            warn!(%error, "pipeline invocation could not start");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response()
        }
    }
}
