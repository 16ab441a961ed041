//! HTTP surface of the search service.
//!
//! `POST /search` never reports failure through the status code: a bad body,
//! a provider outage or a crashed resolution all answer `200` with an empty
//! result list, so the front end can treat every reply the same way.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::{AggregatedResult, SearchRequest, aggregator::Aggregator};

pub fn router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(aggregator)
}

/// Bind `0.0.0.0:{port}` and serve until the process is stopped.
pub async fn serve(aggregator: Arc<Aggregator>, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        port,
        providers = ?aggregator.provider_ids(),
        "City search listening on http://localhost:{port}"
    );

    axum::serve(listener, router(aggregator))
        .await
        .context("HTTP server stopped unexpectedly")
}

async fn search(
    State(aggregator): State<Arc<Aggregator>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Json<AggregatedResult> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(%rejection, "Rejected search body");
            return Json(AggregatedResult::empty());
        }
    };

    // A panic inside a provider must not take the connection down with it.
    let task = tokio::spawn(async move { aggregator.resolve_locations(&request.query).await });

    match task.await {
        Ok(result) => Json(result),
        Err(err) => {
            warn!(error = %err, "Search task failed");
            Json(AggregatedResult::empty())
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
