use serde::{Deserialize, Serialize};

use super::enums::StepType;

/// One outreach action recovered from a structured conversion.
///
/// Fields are optional because the upstream model is untrusted: a row that
/// survives parsing may still carry an unreadable number, day or channel.
/// Numbering problems are reported as warnings rather than rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_number: Option<u32>,
    pub step_day: Option<u32>,
    pub step_type: Option<StepType>,
    /// Only meaningful for email steps.
    pub subject: String,
    pub body: String,
}

impl StepRecord {
    /// A row with no usable content at all.
    pub fn is_blank(&self) -> bool {
        self.step_number.is_none()
            && self.step_day.is_none()
            && self.step_type.is_none()
            && self.subject.trim().is_empty()
            && self.body.trim().is_empty()
    }
}
