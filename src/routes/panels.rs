//! Read-only panels fed at load time: form defaults, feature importance and
//! the city temperature comparison.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use tracing::debug;

use crate::{feature_shares, Dashboard, WeatherInput};

// ---

pub fn router() -> Router<Arc<Dashboard>> {
    // ---
    Router::new()
        .route("/api/form-defaults", get(form_defaults))
        .route("/api/feature-importance", get(feature_importance))
        .route("/api/comparison", get(comparison))
}

async fn form_defaults() -> Json<WeatherInput> {
    Json(WeatherInput::default())
}

/// Entries with their share of the total, in the order the model listed them.
async fn feature_importance(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    // ---
    let entries = dashboard.feature_importance().await;
    debug!("GET /api/feature-importance - {} entries", entries.len());
    Json(feature_shares(&entries))
}

/// Merged comparison series; empty until (and unless) the archive fetch succeeds.
async fn comparison(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    // ---
    let points = dashboard.comparison().await;
    debug!("GET /api/comparison - {} dated records", points.len());
    Json(points)
}
