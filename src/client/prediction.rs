use serde::Deserialize;

use super::ApiClient;
use crate::{RequestError, WeatherInput};

// ---

/// Body returned by `POST /predict`. Anything besides `prediction` is ignored.
#[derive(Debug, Deserialize)]
struct PredictionResponse {
    prediction: String,
}

impl ApiClient {
    // ---
    /// Submit `input` to the prediction service and return its label.
    ///
    /// The caller is expected to have validated `input` already. Each call is
    /// an independent request; overlapping calls are neither merged nor
    /// cancelled.
    #[tracing::instrument(skip(self, input), fields(date = %input.date))]
    pub async fn predict(&self, input: &WeatherInput) -> Result<String, RequestError> {
        // ---
        let url = format!("{}/predict", self.prediction_api_url);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                url: url.clone(),
                source,
            })?;

        let body: PredictionResponse = Self::read_json(response, &url).await?;
        tracing::info!("Prediction received: {}", body.prediction);

        Ok(body.prediction)
    }
}
