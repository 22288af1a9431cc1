use std::sync::Arc;

use axum::Router;

use crate::Dashboard;

mod health;
mod panels;
mod predictions;

// ---

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    // ---
    Router::new()
        .merge(predictions::router())
        .merge(panels::router())
        .merge(health::router())
        .with_state(dashboard)
}
