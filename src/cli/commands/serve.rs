//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for managing sources, searching and asking
//! questions. Source IDs in paths must be percent-encoded.

use super::load_sources;
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::error::{LecturMateError, SourceError};
use crate::orchestrator::{Orchestrator, SourceSummary};
use crate::rag::ContextChunk;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: &str,
    port: u16,
    sources: &[String],
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check_providers(&settings)?;

    let orchestrator = Orchestrator::new(settings)?;
    if !sources.is_empty() {
        preflight::check_sources(sources)?;
        load_sources(&orchestrator, sources).await?;
    }

    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/sources", get(list_sources).post(add_source))
        .route("/sources/{id}", delete(remove_source))
        .route("/search", post(search))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("LecturMate API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("List sources", "GET    /sources");
    Output::kv("Add source", "POST   /sources");
    Output::kv("Remove source", "DELETE /sources/{id}");
    Output::kv("Search", "POST   /search");
    Output::kv("Ask (RAG)", "POST   /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AddSourceRequest {
    /// File path, YouTube URL or video ID
    input: String,
}

#[derive(Serialize)]
struct SourcesResponse {
    sources: Vec<SourceSummary>,
    total: usize,
    chunks: usize,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    k: Option<usize>,
    #[serde(default)]
    min_score: Option<f32>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<ContextChunk>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default)]
    k: Option<usize>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<ContextChunk>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP status for a library error.
fn error_status(e: &LecturMateError) -> StatusCode {
    match e {
        LecturMateError::EmptyCorpus => StatusCode::CONFLICT,
        LecturMateError::Source(SourceError::NotFound(_)) => StatusCode::NOT_FOUND,
        LecturMateError::Source(SourceError::UnsupportedFormat(_))
        | LecturMateError::InvalidInput(_)
        | LecturMateError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
        LecturMateError::Source(SourceError::ToolNotFound(_)) => StatusCode::SERVICE_UNAVAILABLE,
        LecturMateError::Embedding(_)
        | LecturMateError::Generation(_)
        | LecturMateError::Ollama(_)
        | LecturMateError::OpenAI(_)
        | LecturMateError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: LecturMateError) -> Response {
    let status = error_status(&e);
    if status.is_server_error() {
        warn!("Request failed: {}", e);
    }

    let error = match e {
        LecturMateError::EmptyCorpus => "No text loaded: load a source first".to_string(),
        other => other.to_string(),
    };
    (status, Json(ErrorResponse { error })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sources = state.orchestrator.sources().await;
    Json(SourcesResponse {
        total: sources.len(),
        chunks: state.orchestrator.chunk_count(),
        sources,
    })
}

async fn add_source(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddSourceRequest>,
) -> Response {
    match state.orchestrator.add_source(&req.input).await {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn remove_source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.orchestrator.remove_source(&id).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => error_response(e),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Response {
    match state
        .orchestrator
        .search(&req.query, req.k, req.min_score)
        .await
    {
        Ok(results) => Json(SearchResponse { results }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Response {
    let response = match req.k {
        Some(k) => state.orchestrator.ask_with_k(&req.question, k).await,
        None => state.orchestrator.ask(&req.question).await,
    };

    match response {
        Ok(response) => Json(AskResponse {
            answer: response.answer,
            sources: response.sources,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}
