// Advisory cross-checks between a parsed step table and the independent
// step estimate taken from the draft text. Nothing here blocks a conversion.
//
// Each check runs on its own and all applicable warnings are returned
// together. Checks that need step numbers are skipped when no row has one;
// checks that need the estimate are skipped when the draft had no headings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::extractor::StepEstimate;
use super::parser::ParsedTable;
use crate::models::StepRecord;

/// Most step numbers a warning lists; the remainder is only counted.
pub const MAX_LISTED_STEPS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Highest step number is larger than the number of rows.
    RowCountBelowMaxStep { rows: usize, max_step: u32 },
    /// The draft mentions steps past the last parsed one.
    TruncatedConversion {
        observed_max: u32,
        parsed_max: u32,
        missing: Vec<u32>,
        /// Missing steps past the listed ones.
        omitted: u32,
    },
    /// The draft names more distinct steps than there are rows.
    FewerRowsThanObserved { observed: usize, rows: usize },
    /// Holes between the lowest and highest parsed step numbers.
    NumberingGaps { missing: Vec<u32>, omitted: u32 },
    DuplicateStepNumbers { numbers: Vec<u32> },
    UnrecognizedStepType { row: usize, value: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCountBelowMaxStep { rows, max_step } => write!(
                f,
                "Table has {rows} rows but step numbers go up to {max_step}; numbering is duplicated or out of range"
            ),
            Self::TruncatedConversion {
                observed_max,
                parsed_max,
                missing,
                omitted,
            } => write!(
                f,
                "Sequence has steps up to {observed_max} but the table stops at step {parsed_max}. Missing steps: {}",
                join_numbers(missing, *omitted)
            ),
            Self::FewerRowsThanObserved { observed, rows } => write!(
                f,
                "Sequence appears to have {observed} steps but the table has only {rows} rows"
            ),
            Self::NumberingGaps { missing, omitted } => {
                write!(
                    f,
                    "Missing step numbers in table: {}",
                    join_numbers(missing, *omitted)
                )
            }
            Self::DuplicateStepNumbers { numbers } => {
                write!(f, "Duplicate step numbers in table: {}", join_numbers(numbers, 0))
            }
            Self::UnrecognizedStepType { row, value } => {
                write!(f, "Row {row} has unrecognized step_type '{value}'")
            }
        }
    }
}

fn join_numbers(numbers: &[u32], omitted: u32) -> String {
    let listed = numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if omitted > 0 {
        format!("{listed} and {omitted} more")
    } else {
        listed
    }
}

/// Take at most `MAX_LISTED_STEPS` numbers from `numbers`, whose full
/// length is `total`, and report how many were left out.
fn capped(numbers: impl Iterator<Item = u32>, total: u32) -> (Vec<u32>, u32) {
    let listed: Vec<u32> = numbers.take(MAX_LISTED_STEPS).collect();
    let omitted = total.saturating_sub(listed.len() as u32);
    (listed, omitted)
}

/// Compare parsed rows with the draft's step estimate.
pub fn cross_validate(rows: &[StepRecord], estimate: &StepEstimate) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let row_count = rows.len();
    let numbers: Vec<u32> = rows.iter().filter_map(|r| r.step_number).collect();
    let present: BTreeSet<u32> = numbers.iter().copied().collect();

    if let (Some(&min), Some(&max)) = (present.first(), present.last()) {
        if max as usize > row_count {
            warnings.push(ValidationWarning::RowCountBelowMaxStep {
                rows: row_count,
                max_step: max,
            });
        }

        if estimate.has_ground_truth() && estimate.observed_max_step > max {
            let observed_max = estimate.observed_max_step;
            let (missing, omitted) = capped(max + 1..=observed_max, observed_max - max);
            warnings.push(ValidationWarning::TruncatedConversion {
                observed_max,
                parsed_max: max,
                missing,
                omitted,
            });
        }

        // Walks neighbouring present numbers, never the full min..=max span.
        let gap_ranges = || {
            present
                .iter()
                .zip(present.iter().skip(1))
                .filter(|(a, b)| **b > **a + 1)
                .map(|(a, b)| a + 1..*b)
        };
        let gap_total: u32 = gap_ranges().map(|r| r.end - r.start).sum();
        if gap_total > 0 {
            let (missing, omitted) = capped(gap_ranges().flatten(), gap_total);
            warnings.push(ValidationWarning::NumberingGaps { missing, omitted });
        }
    }

    if estimate.has_ground_truth() && estimate.distinct_steps() > row_count {
        warnings.push(ValidationWarning::FewerRowsThanObserved {
            observed: estimate.distinct_steps(),
            rows: row_count,
        });
    }

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for n in numbers {
        *counts.entry(n).or_default() += 1;
    }
    let duplicates: Vec<u32> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(n, _)| n)
        .collect();
    if !duplicates.is_empty() {
        warnings.push(ValidationWarning::DuplicateStepNumbers {
            numbers: duplicates,
        });
    }

    warnings
}

/// All advisory warnings for a parsed table: cross-checks plus any
/// unrecognized channel values the parser reported.
pub fn validate_table(table: &ParsedTable, estimate: &StepEstimate) -> Vec<ValidationWarning> {
    let mut warnings = cross_validate(&table.rows, estimate);
    warnings.extend(table.unrecognized_step_types.iter().map(|u| {
        ValidationWarning::UnrecognizedStepType {
            row: u.row,
            value: u.value.clone(),
        }
    }));

    if !warnings.is_empty() {
        tracing::warn!(
            warning_count = warnings.len(),
            rows = table.rows.len(),
            observed_max = estimate.observed_max_step,
            "Step table validation warnings detected"
        );
    }

    warnings
}
