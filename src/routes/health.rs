// src/routes/health.rs
//! Liveness endpoint for the SkyCast dashboard API.
//!
//! `GET /health` answers as long as the process is serving requests. It never
//! calls the prediction service or the weather archive, so a collaborator
//! outage does not make the dashboard look dead.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Subrouter with the `/health` route, generic over the gateway's state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
