// Independent step estimate from free-form sequence text.
// Used only to cross-check the structured conversion; never to build rows.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Heading styles that mark a step boundary. A single line may match
/// several of these; matches are merged by step number.
static STEP_HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "## Step 3"
        Regex::new(r"(?i)##\s*step\s+([0-9]+)").unwrap(),
        // "Step 3:"
        Regex::new(r"(?i)\bstep\s+([0-9]+):").unwrap(),
        // "Step 3 " (trailing space)
        Regex::new(r"(?i)\bstep\s+([0-9]+) ").unwrap(),
        // "Step 3."
        Regex::new(r"(?i)\bstep\s+([0-9]+)\.").unwrap(),
    ]
});

/// Best-effort view of which steps a sequence text contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepEstimate {
    pub observed_step_numbers: BTreeSet<u32>,
    /// 0 when no step heading was found.
    pub observed_max_step: u32,
}

impl StepEstimate {
    /// False when the text had no recognizable step headings, in which
    /// case cross-checks against this estimate are skipped.
    pub fn has_ground_truth(&self) -> bool {
        !self.observed_step_numbers.is_empty()
    }

    pub fn distinct_steps(&self) -> usize {
        self.observed_step_numbers.len()
    }
}

/// Scan sequence text for step headings and collect their numbers.
pub fn extract_step_estimate(sequence: &str) -> StepEstimate {
    let observed_step_numbers: BTreeSet<u32> = STEP_HEADING_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(sequence))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .collect();

    let observed_max_step = observed_step_numbers.last().copied().unwrap_or(0);

    StepEstimate {
        observed_step_numbers,
        observed_max_step,
    }
}
