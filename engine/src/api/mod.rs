//! HTTP API
//!
//! Thin axum adapter over [`Session`].
//!
//! # Endpoints
//!
//! - POST /query - Answer a query (`{ query, context: { mode?, fileContext? } }`)
//! - GET /history?limit=N - Recent conversation history (default 50)
//! - POST /clear_memory - Clear conversation memory
//! - GET /health - Liveness check
//! - GET /kb - Everything in the knowledge base
//! - POST /kb/learn - Teach the knowledge base (`{ source, content }`)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sdk::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::conductor::{Interaction, RequestContext, Session};

const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub context: RequestContext,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<Interaction>,
}

#[derive(Debug, Deserialize)]
pub struct LearnRequest {
    pub source: String,
    pub content: String,
}

/// Build the API router over a shared session
pub fn router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/query", post(query_handler))
        .route("/history", get(history_handler))
        .route("/clear_memory", post(clear_memory_handler))
        .route("/health", get(health_handler))
        .route("/kb", get(kb_handler))
        .route("/kb/learn", post(learn_handler))
        .layer(CorsLayer::permissive())
        .with_state(session)
}

/// Serve the API until Ctrl+C
pub async fn serve(session: Arc<Session>, addr: SocketAddr) -> Result<(), EngineError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EngineError::Network(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, router(session))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("API server shutting down gracefully");
        })
        .await
        .map_err(|e| EngineError::Network(format!("API server error: {}", e)))
}

async fn query_handler(
    State(session): State<Arc<Session>>,
    Json(request): Json<QueryRequest>,
) -> Response {
    if request.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "query must not be empty" })),
        )
            .into_response();
    }

    let result = session.process_query(&request.query, request.context).await;
    Json(result).into_response()
}

async fn history_handler(
    State(session): State<Arc<Session>>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = session.memory().history(Some(limit)).to_vec();
    Json(HistoryResponse { history })
}

async fn clear_memory_handler(State(session): State<Arc<Session>>) -> Json<serde_json::Value> {
    session.clear_memory().await;
    Json(json!({ "status": "success", "message": "Memory cleared" }))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "agent_status": "ready" }))
}

async fn kb_handler(State(session): State<Arc<Session>>) -> Json<serde_json::Value> {
    let all = json!(session.knowledge().all());
    Json(all)
}

async fn learn_handler(
    State(session): State<Arc<Session>>,
    Json(request): Json<LearnRequest>,
) -> Json<serde_json::Value> {
    session.knowledge().learn(&request.source, &request.content);
    Json(json!({
        "status": "success",
        "message": format!("Learned about {}", request.source)
    }))
}
