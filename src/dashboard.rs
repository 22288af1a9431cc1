//! Session state behind the dashboard panels.
//!
//! A single [`Dashboard`] owns everything a page session sees: the prediction
//! history, the feature importance entries and the merged city comparison. It
//! is shared with the routes through an `Arc`; each panel sits behind its own
//! `RwLock` so independent fetches never wait on each other.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::{
    ApiClient, ChartRow, ComparisonPoint, FeatureImportance, Location, PredictionResult,
    SessionHistory, SubmitError, WeatherInput, COMPARISON_LOCATIONS,
};

// ---

#[derive(Debug)]
pub struct Dashboard {
    // ---
    client: ApiClient,
    locations: Vec<Location>,
    history: RwLock<SessionHistory>,
    feature_importance: RwLock<Vec<FeatureImportance>>,
    comparison: RwLock<Vec<ComparisonPoint>>,
}

impl Dashboard {
    // ---
    /// Empty dashboard comparing the default five cities.
    pub fn new(client: ApiClient) -> Self {
        Self::with_locations(client, COMPARISON_LOCATIONS.to_vec())
    }

    pub fn with_locations(client: ApiClient, locations: Vec<Location>) -> Self {
        // ---
        Dashboard {
            client,
            locations,
            history: RwLock::new(SessionHistory::new()),
            feature_importance: RwLock::new(Vec::new()),
            comparison: RwLock::new(Vec::new()),
        }
    }

    /// Validate `input`, ask for a prediction and record the outcome.
    ///
    /// Invalid input is rejected before any request is sent. A failed request
    /// is logged and dropped: the history only ever grows by one entry per
    /// successful response, in the order responses arrive. With overlapping
    /// submissions the slowest response ends up as the latest entry.
    #[tracing::instrument(skip(self, input), fields(date = %input.date))]
    pub async fn submit(&self, input: WeatherInput) -> Result<PredictionResult, SubmitError> {
        // ---
        if let Err(e) = input.validate() {
            tracing::warn!("Rejected submission: {}", e);
            return Err(e.into());
        }

        let prediction = match self.client.predict(&input).await {
            Ok(prediction) => prediction,
            Err(e) => {
                tracing::error!("Prediction request failed: {}", e);
                return Err(e.into());
            }
        };

        let result = PredictionResult::new(&input, prediction, Utc::now());

        let mut history = self.history.write().await;
        history.append(result.clone());
        tracing::debug!("History now holds {} predictions", history.len());

        Ok(result)
    }

    /// Replace the feature importance entries with a fresh fetch.
    ///
    /// On failure the error is logged and the previous entries are kept.
    pub async fn refresh_feature_importance(&self) {
        // ---
        match self.client.feature_importance().await {
            Ok(entries) => *self.feature_importance.write().await = entries,
            Err(e) => tracing::error!("Error fetching feature importance: {}", e),
        }
    }

    /// Replace the comparison series with a fresh fetch for the window
    /// ending two days before `today`.
    ///
    /// On failure the error is logged and the previous series is kept.
    pub async fn refresh_comparison(&self, today: NaiveDate) {
        // ---
        match self.client.comparison(today, &self.locations).await {
            Ok(points) => *self.comparison.write().await = points,
            Err(e) => tracing::error!("Error fetching comparison data: {}", e),
        }
    }

    /// Start the two load-time fetches as independent background tasks.
    pub fn spawn_mount_tasks(self: &Arc<Self>) -> (JoinHandle<()>, JoinHandle<()>) {
        // ---
        let dashboard = Arc::clone(self);
        let importance = tokio::spawn(async move {
            dashboard.refresh_feature_importance().await;
        });

        let dashboard = Arc::clone(self);
        let comparison = tokio::spawn(async move {
            dashboard.refresh_comparison(Utc::now().date_naive()).await;
        });

        (importance, comparison)
    }

    pub async fn history(&self) -> Vec<PredictionResult> {
        self.history.read().await.entries().to_vec()
    }

    pub async fn history_len(&self) -> usize {
        self.history.read().await.len()
    }

    pub async fn latest(&self) -> Option<PredictionResult> {
        self.history.read().await.latest().cloned()
    }

    pub async fn chart_rows(&self) -> Vec<ChartRow> {
        self.history.read().await.chart_rows()
    }

    pub async fn feature_importance(&self) -> Vec<FeatureImportance> {
        self.feature_importance.read().await.clone()
    }

    pub async fn comparison(&self) -> Vec<ComparisonPoint> {
        self.comparison.read().await.clone()
    }
}
