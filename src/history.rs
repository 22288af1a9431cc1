//! Append-only record of the predictions made during this session.

use crate::{ChartRow, PredictionResult};

// ---

/// Ordered, in-memory list of prediction results.
///
/// Entries are only ever appended, in the order their responses arrived.
/// Nothing is removed or capped, and nothing outlives the process.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<PredictionResult>,
}

impl SessionHistory {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, result: PredictionResult) {
        self.entries.push(result);
    }

    pub fn entries(&self) -> &[PredictionResult] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&PredictionResult> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// History reshaped for the predictions line chart.
    pub fn chart_rows(&self) -> Vec<ChartRow> {
        self.entries.iter().map(PredictionResult::to_chart_row).collect()
    }
}
