//! Daily maximum temperatures from the weather archive, fetched for every
//! compared location at once and merged by date.

use chrono::NaiveDate;
use serde::Deserialize;
use tokio::task::JoinSet;

use super::ApiClient;
use crate::{merge_by_date, ComparisonPoint, Location, LocationSeries, RequestError};

// ---

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: DailyTemperatures,
}

#[derive(Debug, Deserialize)]
struct DailyTemperatures {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
}

/// Trailing five-day window ending two days before `today`: `[today-6d, today-2d]`.
///
/// The archive lags a couple of days behind real time.
pub fn comparison_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    // ---
    let start = today - chrono::Duration::days(6);
    let end = today - chrono::Duration::days(2);
    (start, end)
}

impl ApiClient {
    // ---
    /// Fetch one location's daily maximum temperatures for `start..=end`.
    #[tracing::instrument(skip(self), fields(city = location.name))]
    pub async fn daily_max_temperatures(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<LocationSeries, RequestError> {
        // ---
        let url = format!(
            "{}/v1/archive?latitude={}&longitude={}&start_date={}&end_date={}&daily=temperature_2m_max",
            self.archive_api_url,
            location.latitude,
            location.longitude,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );

        let response: ArchiveResponse = self.get_json(&url).await?;
        let daily = response.daily;

        if daily.time.len() != daily.temperature_2m_max.len() {
            tracing::warn!(
                "{}: {} dates but {} temperatures, extra entries ignored",
                location.name,
                daily.time.len(),
                daily.temperature_2m_max.len()
            );
        }

        let mut points = Vec::with_capacity(daily.time.len());
        for (raw_date, temperature) in daily.time.iter().zip(daily.temperature_2m_max) {
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                RequestError::Decode {
                    url: url.clone(),
                    reason: format!("bad date '{}': {}", raw_date, e),
                }
            })?;

            match temperature {
                Some(t) => points.push((date, t)),
                None => tracing::debug!("{}: no reading for {}", location.name, date),
            }
        }

        Ok(LocationSeries {
            location: location.name.to_string(),
            points,
        })
    }

    /// Fetch every location concurrently and merge the results by date.
    ///
    /// Fails as a whole if any single location fails; the remaining requests
    /// are aborted and no partial merge is returned. Locations are merged in
    /// the order given, regardless of which response arrives first.
    #[tracing::instrument(skip(self, locations), fields(count = locations.len()))]
    pub async fn comparison(
        &self,
        today: NaiveDate,
        locations: &[Location],
    ) -> Result<Vec<ComparisonPoint>, RequestError> {
        // ---
        let (start, end) = comparison_window(today);
        tracing::debug!("Comparison window {} .. {}", start, end);

        let mut tasks = JoinSet::new();
        for (i, location) in locations.iter().copied().enumerate() {
            let client = self.clone();
            tasks.spawn(async move {
                let series = client.daily_max_temperatures(&location, start, end).await;
                (i, series)
            });
        }

        let mut slots: Vec<Option<LocationSeries>> = vec![None; locations.len()];
        while let Some(joined) = tasks.join_next().await {
            let (i, series) = joined?;
            slots[i] = Some(series?);
        }

        let series: Vec<LocationSeries> = slots.into_iter().flatten().collect();
        let merged = merge_by_date(&series);

        tracing::info!(
            "Merged {} locations into {} dated records",
            series.len(),
            merged.len()
        );
        Ok(merged)
    }
}
