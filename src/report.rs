//! Keypress report returned to HTTP callers

use crate::keyboard::{KeyOutcome, KeypressResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete report for one keypress request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeypressReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary statistics
    pub summary: KeypressSummary,
    /// One entry per requested character, in order
    pub keys: Vec<KeyReport>,
    /// Failure cause when the request was aborted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Key whose release never reached the device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub held: Option<String>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Wall time spent sequencing, in milliseconds
    pub duration_ms: u64,
    /// Layout used for translation
    pub layout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeypressSummary {
    pub characters: usize,
    pub typed: usize,
    pub unmapped: usize,
}

/// Single key entry; scancode and modifier are `null` when unmapped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyReport {
    #[serde(rename = "char")]
    pub character: String,
    pub scancode: Option<u8>,
    pub modifier: Option<u8>,
}

impl From<&KeyOutcome> for KeyReport {
    fn from(outcome: &KeyOutcome) -> Self {
        Self {
            character: outcome.character.to_string(),
            scancode: outcome.entry.map(|e| e.scancode),
            modifier: outcome.entry.map(|e| e.modifier),
        }
    }
}

impl KeypressReport {
    pub fn new(result: &KeypressResult, layout: &str, elapsed: Duration) -> Self {
        let now: DateTime<Utc> = Utc::now();

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_ms: elapsed.as_millis() as u64,
                layout: layout.to_string(),
            },
            summary: KeypressSummary {
                characters: result.len(),
                typed: result.typed_count(),
                unmapped: result.unmapped_count(),
            },
            keys: result.iter().map(KeyReport::from).collect(),
            error: None,
            held: None,
        }
    }

    /// Attach the cause of an aborted request
    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Record a key left pressed by a failed release
    pub fn with_held(mut self, character: char) -> Self {
        self.held = Some(character.to_string());
        self
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
