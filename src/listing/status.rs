//! Extraction status definitions
//!
//! Each platform's result carries one of these tags so callers can tell a
//! platform that had nothing to offer apart from one that failed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents how a single platform's extraction ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// At least one genuine listing was extracted
    Ok,

    /// The page was reachable but nothing could be parsed from it
    Degraded { reason: String },

    /// The upstream answered with no results
    Empty,

    /// The platform could not be reached (transport error, timeout, bad status)
    Failed { reason: String },
}

impl ExtractionStatus {
    /// Returns true if genuine listings were extracted
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Degraded { .. } => "degraded",
            Self::Empty => "empty",
            Self::Failed { .. } => "failed",
        }
    }

    /// The reason attached to degraded or failed outcomes
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Degraded { reason } | Self::Failed { reason } => Some(reason),
            Self::Ok | Self::Empty => None,
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{} ({})", self.label(), reason),
            None => write!(f, "{}", self.label()),
        }
    }
}
