//! Error types for input validation and the outbound HTTP clients.

use std::fmt;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

// ---

/// A single field outside its declared bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} outside [{}, {}]",
            self.field, self.value, self.min, self.max
        )
    }
}

/// Input rejected before any network call was made.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid input: {}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure talking to one of the external collaborators.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("unexpected response body from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("request task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Why a prediction submission was dropped.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),
}
