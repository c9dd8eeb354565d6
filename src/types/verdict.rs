//! Scoring verdict data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Presentation severity for a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Error,
}

/// Outcome of scoring one submitted transaction.
///
/// Nothing outlives the submission: the verdict is rendered once and dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Unique evaluation identifier, for correlating request logs
    pub evaluation_id: String,

    /// Fraud probability reported by the classifier (0.0 - 1.0)
    pub probability: f64,

    /// Predicted class label (1 = fraud, 0 = legitimate)
    pub label: u8,

    /// Evaluation timestamp
    pub timestamp: DateTime<Utc>,
}

impl Verdict {
    pub fn new(probability: f64, label: u8) -> Self {
        Self {
            evaluation_id: uuid::Uuid::new_v4().to_string(),
            probability,
            label,
            timestamp: Utc::now(),
        }
    }

    pub fn is_fraud(&self) -> bool {
        self.label == 1
    }

    pub fn status_level(&self) -> StatusLevel {
        if self.is_fraud() {
            StatusLevel::Error
        } else {
            StatusLevel::Success
        }
    }
}
