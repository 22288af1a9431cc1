use serde_json::{Map, Value};

use super::ApiClient;
use crate::{FeatureImportance, RequestError};

// ---

impl ApiClient {
    // ---
    /// Fetch the model's feature weights as display-ready entries.
    ///
    /// Entries follow the key order of the response document.
    #[tracing::instrument(skip(self))]
    pub async fn feature_importance(&self) -> Result<Vec<FeatureImportance>, RequestError> {
        // ---
        let url = format!("{}/feature-importance", self.prediction_api_url);
        let raw: Map<String, Value> = self.get_json(&url).await?;

        let entries = raw
            .into_iter()
            .map(|(identifier, weight)| match weight.as_f64() {
                Some(value) => Ok(FeatureImportance::from_raw(&identifier, value)),
                None => Err(RequestError::Decode {
                    url: url.clone(),
                    reason: format!("weight for '{}' is not a number: {}", identifier, weight),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Fetched {} feature importance entries", entries.len());
        Ok(entries)
    }
}
