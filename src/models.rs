//! Data models for the dashboard: form input, prediction results, feature
//! importance entries and the merged city comparison series.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{FieldViolation, ValidationError};

// ---

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = -100.0..=100.0;
pub const APPARENT_TEMPERATURE_RANGE: RangeInclusive<f64> = -100.0..=100.0;
pub const WINDSPEED_RANGE: RangeInclusive<f64> = 0.0..=200.0;
pub const PRECIPITATION_RANGE: RangeInclusive<f64> = 0.0..=1000.0;

/// The five weather features submitted to the prediction model.
///
/// `date` travels on the wire as an ISO-8601 instant at UTC midnight, the
/// same shape a browser produces for a date input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInput {
    // ---
    pub temperature_2m_mean: f64,
    pub apparent_temperature_mean: f64,
    pub windspeed_10m_max: f64,
    pub precipitation_sum: f64,
    #[serde(with = "submission_date")]
    pub date: NaiveDate,
}

impl WeatherInput {
    // ---
    /// Form defaults used to pre-populate the input panel for `date`.
    pub fn defaults_for(date: NaiveDate) -> Self {
        // ---
        WeatherInput {
            temperature_2m_mean: 20.0,
            apparent_temperature_mean: 17.0,
            windspeed_10m_max: 15.0,
            precipitation_sum: 0.8,
            date,
        }
    }

    /// Check every field against its declared bound.
    ///
    /// Each predicate is evaluated independently so the error lists all
    /// offending fields, not just the first one. NaN is never in range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        // ---
        let checks = [
            ("temperature_2m_mean", self.temperature_2m_mean, TEMPERATURE_RANGE),
            (
                "apparent_temperature_mean",
                self.apparent_temperature_mean,
                APPARENT_TEMPERATURE_RANGE,
            ),
            ("windspeed_10m_max", self.windspeed_10m_max, WINDSPEED_RANGE),
            ("precipitation_sum", self.precipitation_sum, PRECIPITATION_RANGE),
        ];

        let violations: Vec<FieldViolation> = checks
            .into_iter()
            .filter(|(_, value, range)| !range.contains(value))
            .map(|(field, value, range)| FieldViolation {
                field,
                value,
                min: *range.start(),
                max: *range.end(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

impl Default for WeatherInput {
    fn default() -> Self {
        Self::defaults_for(Utc::now().date_naive())
    }
}

/// A successful prediction together with the input that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    // ---
    pub temperature_2m_mean: f64,
    pub apparent_temperature_mean: f64,
    pub windspeed_10m_max: f64,
    pub precipitation_sum: f64,
    pub prediction: String,
    pub timestamp: DateTime<Utc>,
    /// Submission form of the input date.
    pub date: String,
}

impl PredictionResult {
    // ---
    pub fn new(input: &WeatherInput, prediction: String, timestamp: DateTime<Utc>) -> Self {
        // ---
        PredictionResult {
            temperature_2m_mean: input.temperature_2m_mean,
            apparent_temperature_mean: input.apparent_temperature_mean,
            windspeed_10m_max: input.windspeed_10m_max,
            precipitation_sum: input.precipitation_sum,
            prediction,
            timestamp,
            date: submission_date::format(input.date),
        }
    }

    /// Row for the predictions line chart, keyed by the calendar day.
    pub fn to_chart_row(&self) -> ChartRow {
        // ---
        let date = submission_date::parse(&self.date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.date.clone());

        ChartRow {
            date,
            temperature_2m_mean: self.temperature_2m_mean,
            apparent_temperature_mean: self.apparent_temperature_mean,
            windspeed_10m_max: self.windspeed_10m_max,
            precipitation_sum: self.precipitation_sum,
            prediction: self.prediction.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub date: String,
    pub temperature_2m_mean: f64,
    pub apparent_temperature_mean: f64,
    pub windspeed_10m_max: f64,
    pub precipitation_sum: f64,
    pub prediction: String,
}

/// One slice of the feature importance pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub name: String,
    pub value: f64,
}

impl FeatureImportance {
    // ---
    pub fn from_raw(identifier: &str, value: f64) -> Self {
        FeatureImportance {
            name: display_name(identifier),
            value,
        }
    }
}

/// Turn a raw feature identifier into a label: underscores become spaces and
/// every ASCII word gets an upper-case first letter.
///
/// `wind_speed_10m_max` becomes `Wind Speed 10m Max`. No characters are
/// dropped.
pub fn display_name(identifier: &str) -> String {
    // ---
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';

    let mut out = String::with_capacity(identifier.len());
    let mut prev_word = false;
    for c in identifier.chars().map(|c| if c == '_' { ' ' } else { c }) {
        let word = is_word(c);
        if word && !prev_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_word = word;
    }
    out
}

/// Feature importance entry with its fraction of the total weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureShare {
    pub name: String,
    pub value: f64,
    pub share: f64,
}

pub fn feature_shares(entries: &[FeatureImportance]) -> Vec<FeatureShare> {
    // ---
    let total: f64 = entries.iter().map(|e| e.value).sum();
    entries
        .iter()
        .map(|e| FeatureShare {
            name: e.name.clone(),
            value: e.value,
            share: if total == 0.0 { 0.0 } else { e.value / total },
        })
        .collect()
}

/// A named point whose daily maximum temperature is compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

pub const COMPARISON_LOCATIONS: [Location; 5] = [
    Location {
        name: "sydney",
        latitude: -33.8678,
        longitude: 151.2073,
    },
    Location {
        name: "melbourne",
        latitude: -37.8136,
        longitude: 144.9631,
    },
    Location {
        name: "brisbane",
        latitude: -27.4698,
        longitude: 153.0251,
    },
    Location {
        name: "perth",
        latitude: -31.9505,
        longitude: 115.8605,
    },
    Location {
        name: "adelaide",
        latitude: -34.9285,
        longitude: 138.6007,
    },
];

/// Daily maximum temperatures reported for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSeries {
    pub location: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// All temperatures known for a single day, one entry per location.
///
/// Serializes flat: `{"date": "2024-01-01", "sydney": 20.0, ...}`. A location
/// with no reading for the day has no key at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub temperatures: BTreeMap<String, f64>,
}

/// Merge per-location series into per-date records.
///
/// Dates keep the order in which they are first seen, walking the series in
/// the order given. A later value for the same location and date replaces the
/// earlier one.
pub fn merge_by_date(series: &[LocationSeries]) -> Vec<ComparisonPoint> {
    // ---
    let mut merged: Vec<ComparisonPoint> = Vec::new();
    let mut index: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for s in series {
        for &(date, temperature) in &s.points {
            let slot = *index.entry(date).or_insert_with(|| {
                merged.push(ComparisonPoint {
                    date,
                    temperatures: BTreeMap::new(),
                });
                merged.len() - 1
            });
            merged[slot]
                .temperatures
                .insert(s.location.clone(), temperature);
        }
    }

    merged
}

/// Wire form of a calendar date: `YYYY-MM-DDT00:00:00.000Z`.
///
/// Parsing accepts any RFC 3339 instant (taking its UTC day), a bare
/// `YYYY-MM-DD`, or a date followed by the UTC-midnight suffix. The last two
/// also take signed years outside 0..=9999 (`+10000-01-01`), so everything
/// `format` emits parses back to the same day.
pub mod submission_date {
    // ---
    use chrono::format::ParseError;
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const MIDNIGHT_SUFFIXES: [&str; 3] = ["", "T00:00:00.000Z", "T00:00:00Z"];

    pub fn format(date: NaiveDate) -> String {
        format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
    }

    pub fn parse(s: &str) -> Result<NaiveDate, ParseError> {
        // ---
        if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
            return Ok(instant.with_timezone(&Utc).date_naive());
        }

        let (date, rest) = NaiveDate::parse_and_remainder(s, "%Y-%m-%d")?;
        if MIDNIGHT_SUFFIXES.contains(&rest) {
            Ok(date)
        } else {
            // Trailing input other than a midnight suffix: chrono reports TooLong.
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
        }
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        // ---
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
