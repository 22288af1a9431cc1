//! Outbound HTTP clients for the prediction service and the weather archive.
//!
//! One [`ApiClient`] wraps a shared [`reqwest::Client`]; each collaborator gets
//! its own sibling module adding methods to it:
//! - `prediction` – `POST /predict`
//! - `feature_importance` – `GET /feature-importance`
//! - `archive` – `GET /v1/archive`, one call per compared location
//!
//! No retries and no explicit timeouts are configured.

use serde::de::DeserializeOwned;

use crate::{Config, RequestError};

mod archive;
mod feature_importance;
mod prediction;

pub use archive::comparison_window;

// ---

#[derive(Debug, Clone)]
pub struct ApiClient {
    // ---
    http: reqwest::Client,
    prediction_api_url: String,
    archive_api_url: String,
}

impl ApiClient {
    // ---
    pub fn new(prediction_api_url: &str, archive_api_url: &str) -> Self {
        // ---
        ApiClient {
            http: reqwest::Client::new(),
            prediction_api_url: prediction_api_url.trim_end_matches('/').to_string(),
            archive_api_url: archive_api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.prediction_api_url, &config.archive_api_url)
    }

    /// Turn a response into `T`, treating any non-2xx status as a failure.
    ///
    /// The body is read first and parsed second, so a broken connection is a
    /// `Transport` error and a malformed body is a `Decode` error.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        url: &str,
    ) -> Result<T, RequestError> {
        // ---
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| RequestError::Transport {
                url: url.to_string(),
                source,
            })?;

        tracing::trace!("{} raw response: {}", url, body);

        serde_json::from_str(&body).map_err(|e| RequestError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RequestError> {
        // ---
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| RequestError::Transport {
                url: url.to_string(),
                source,
            })?;

        Self::read_json(response, url).await
    }
}
