//! Prediction submission and session history endpoints.
//!
//! - `POST /api/predictions` – validate, predict, append to the history
//! - `GET  /api/predictions` – the whole history in arrival order
//! - `GET  /api/predictions/latest` – most recent result
//! - `GET  /api/predictions/chart` – history reshaped for the line chart

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{Dashboard, FieldViolation, SubmitError, WeatherInput};

// ---

pub fn router() -> Router<Arc<Dashboard>> {
    // ---
    Router::new()
        .route("/api/predictions", post(submit).get(list))
        .route("/api/predictions/latest", get(latest))
        .route("/api/predictions/chart", get(chart))
}

/// Error body for a dropped submission.
#[derive(Debug, Serialize)]
struct SubmitErrorBody {
    error: String,
    violations: Vec<FieldViolation>,
}

async fn submit(
    State(dashboard): State<Arc<Dashboard>>,
    Json(input): Json<WeatherInput>,
) -> impl IntoResponse {
    // ---
    info!("POST /api/predictions");

    match dashboard.submit(input).await {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(SubmitError::Invalid(e)) => {
            let body = SubmitErrorBody {
                error: e.to_string(),
                violations: e.violations,
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
        Err(SubmitError::Request(_)) => {
            let body = SubmitErrorBody {
                error: "Prediction service request failed".to_string(),
                violations: Vec::new(),
            };
            (StatusCode::BAD_GATEWAY, Json(body)).into_response()
        }
    }
}

async fn list(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    // ---
    let history = dashboard.history().await;
    debug!("GET /api/predictions - {} entries", history.len());
    Json(history)
}

async fn latest(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    // ---
    match dashboard.latest().await {
        Some(result) => (StatusCode::OK, Json(result)).into_response(),
        None => (StatusCode::NOT_FOUND, Json("No predictions yet")).into_response(),
    }
}

async fn chart(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    Json(dashboard.chart_rows().await)
}
