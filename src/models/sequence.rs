use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{Cadence, ProviderKind};

/// Where a piece of generated text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "provider")]
pub enum TextSource {
    /// Produced by a generation backend.
    Generated(ProviderKind),
    /// Canned content used when no backend could produce text.
    Canned,
    /// Supplied by the caller rather than generated in this session.
    Imported,
}

/// Qualification narrative for one research record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub text: String,
    pub source: TextSource,
    pub generated_at: DateTime<Utc>,
}

/// Raw generated outreach text for one persona lane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceDraft {
    pub lane_id: String,
    pub persona_name: String,
    pub cadence: Cadence,
    pub text: String,
    pub source: TextSource,
    pub generated_at: DateTime<Utc>,
}

impl SequenceDraft {
    /// Draft built from text produced elsewhere, e.g. loaded from disk.
    pub fn from_text(lane_id: &str, persona_name: &str, cadence: Cadence, text: &str) -> Self {
        Self {
            lane_id: lane_id.to_string(),
            persona_name: persona_name.to_string(),
            cadence,
            text: text.to_string(),
            source: TextSource::Imported,
            generated_at: Utc::now(),
        }
    }
}
