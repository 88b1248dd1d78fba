//! Named sequence shapes.
//!
//! A cadence fixes how many steps a drafted sequence should contain, on which
//! day offset each step lands, and which channel it uses. The drafting prompt
//! embeds the cadence structure, and the structured conversion demands at
//! least `step_count()` rows for the cadence that produced the draft.

use crate::models::enums::{Cadence, StepType};

/// One planned touch within a cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceStep {
    pub day: u32,
    pub channel: StepType,
    pub label: &'static str,
}

const fn step(day: u32, channel: StepType, label: &'static str) -> CadenceStep {
    CadenceStep {
        day,
        channel,
        label,
    }
}

const STANDARD_STEPS: [CadenceStep; 8] = [
    step(1, StepType::Email, "Initial Email"),
    step(2, StepType::LinkedIn, "LinkedIn Connection"),
    step(4, StepType::Email, "Follow-up Email"),
    step(5, StepType::LinkedIn, "LinkedIn Message"),
    step(7, StepType::Email, "Value Email"),
    step(9, StepType::Phone, "Phone Call Attempt"),
    step(11, StepType::Email, "Final Email"),
    step(14, StepType::Email, "Breakup Email"),
];

const EXTENDED_STEPS: [CadenceStep; 12] = [
    step(1, StepType::Email, "Initial Email"),
    step(2, StepType::LinkedIn, "LinkedIn Connection"),
    step(3, StepType::Phone, "Intro Call"),
    step(5, StepType::Email, "Follow-up Email"),
    step(7, StepType::LinkedIn, "LinkedIn Message"),
    step(9, StepType::Email, "Peer Proof Email"),
    step(12, StepType::Phone, "Phone Call Attempt"),
    step(14, StepType::Email, "Value Email"),
    step(17, StepType::LinkedIn, "LinkedIn Content Share"),
    step(21, StepType::Email, "Multi-thread Email"),
    step(25, StepType::Phone, "Final Call"),
    step(30, StepType::Email, "Breakup Email"),
];

impl Cadence {
    pub fn steps(&self) -> &'static [CadenceStep] {
        match self {
            Self::Standard => &STANDARD_STEPS,
            Self::Extended => &EXTENDED_STEPS,
        }
    }

    /// Number of steps a sequence in this cadence must contain.
    pub fn step_count(&self) -> usize {
        self.steps().len()
    }

    /// Day offset of the final (breakup) step.
    pub fn span_days(&self) -> u32 {
        self.steps().last().map_or(0, |s| s.day)
    }

    /// Markdown skeleton embedded in the drafting prompt.
    pub fn structure_markdown(&self) -> String {
        let mut out = format!(
            "Total Steps: {}\nDuration: {} days\n\n",
            self.step_count(),
            self.span_days()
        );
        for (i, s) in self.steps().iter().enumerate() {
            out.push_str(&format!(
                "## Step {}: {} (Day {})\n**Type:** {}\n",
                i + 1,
                s.label,
                s.day,
                s.channel
            ));
            match s.channel {
                StepType::Email => out.push_str("**Subject:** ...\n**Body:** ...\n\n"),
                StepType::LinkedIn => out.push_str("**Message:** ...\n\n"),
                StepType::Phone => out.push_str("**Opener:** ...\n**If voicemail:** ...\n\n"),
            }
        }
        out
    }
}
