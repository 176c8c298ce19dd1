use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::draw::{DrawRecord, Size};
use super::prediction::{Prediction, Scoreboard, Validation};

/// Tracker state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerPhase {
    /// No history yet, nothing predicted
    NoPrediction,
    /// A prediction is waiting for its draw
    Predicted,
    /// The last prediction was validated and a new one issued
    Validated,
}

impl TrackerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerPhase::NoPrediction => "NO_PREDICTION",
            TrackerPhase::Predicted => "PREDICTED",
            TrackerPhase::Validated => "VALIDATED",
        }
    }

    /// Check if this phase can transition to another phase
    pub fn can_transition_to(&self, target: TrackerPhase) -> bool {
        use TrackerPhase::*;

        match (self, target) {
            // First prediction
            (NoPrediction, Predicted) => true,

            // New draw resolved the pending prediction
            (Predicted, Validated) => true,
            (Validated, Validated) => true,

            // New draw observed before any prediction could be checked
            (Predicted, Predicted) => true,

            _ => false,
        }
    }
}

impl fmt::Display for TrackerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only view published to the presentation layer after each cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub prediction: Option<Prediction>,
    pub validation: Option<Validation>,
    /// Newest-first
    pub recent_history: Vec<DrawRecord>,
    pub type_trend: Vec<Size>,
    pub color_trend: Vec<String>,
    pub scoreboard: Scoreboard,
    pub phase: TrackerPhase,
    pub updated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn empty() -> Self {
        Self {
            prediction: None,
            validation: None,
            recent_history: Vec::new(),
            type_trend: Vec::new(),
            color_trend: Vec::new(),
            scoreboard: Scoreboard::default(),
            phase: TrackerPhase::NoPrediction,
            updated_at: Utc::now(),
        }
    }
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
