//! SkyCast: backend for a weather prediction dashboard.
//!
//! Collects the five weather features from a form, asks an external model for
//! a prediction and keeps the session's results next to two load-time panels:
//! the model's feature importance and a five-city temperature comparison
//! pulled from a public weather archive.
//!
//! Module layout (EMBP: each module talks to its siblings through this
//! gateway only):
//! - `models` – input record, results, chart shapes, merge by date
//! - `error` – validation and request errors
//! - `client` – outbound HTTP calls to the prediction service and archive
//! - `history` – append-only session history
//! - `dashboard` – the shared session state
//! - `routes` – JSON endpoints over the dashboard
//! - `config` – environment configuration

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod models;
pub mod routes;

pub use client::{comparison_window, ApiClient};
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{FieldViolation, RequestError, SubmitError, ValidationError};
pub use history::SessionHistory;
pub use models::{
    display_name, feature_shares, merge_by_date, ChartRow, ComparisonPoint, FeatureImportance,
    FeatureShare, Location, LocationSeries, PredictionResult, WeatherInput,
    COMPARISON_LOCATIONS,
};
