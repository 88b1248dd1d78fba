use crate::models::enums::Cadence;
use crate::pipeline::generation::SamplingParams;

/// Header line the converter must emit, in column order.
pub const STEP_TABLE_HEADER: &str = "step_number,step_day,step_type,subject,body";

pub const CONVERSION_SYSTEM_PROMPT: &str = "You are a data formatter. \
You convert outreach sequences into clean CSV. \
Extract every step in the sequence and never skip, merge or summarize steps.";

/// Token ceiling for the conversion output. Longer cadences need room for
/// every row, so truncation does not silently drop the final steps.
pub fn conversion_sampling(cadence: Cadence) -> SamplingParams {
    match cadence {
        Cadence::Standard => SamplingParams::new(0.0, 4000),
        Cadence::Extended => SamplingParams::new(0.0, 6000),
    }
}

/// Build the prompt asking a generator to restate a drafted sequence as a
/// step table. States the minimum step count implied by the cadence.
pub fn build_conversion_prompt(sequence: &str, cadence: Cadence) -> String {
    let min_steps = cadence.step_count();
    format!(
        r#"Convert the outreach sequence below into CSV.

CRITICAL: The sequence contains at least {min_steps} steps. Your CSV must contain one row for EVERY step, numbered consecutively from 1.

OUTPUT FORMAT:
- First line is exactly this header: {STEP_TABLE_HEADER}
- step_number: integer, starting at 1
- step_day: integer day offset from the start of the sequence
- step_type: one of Email, LinkedIn, Phone
- subject: email subject line; leave empty for LinkedIn and Phone steps
- body: the full message text or call script
- Wrap every subject and body in double quotes
- Escape double quotes inside a field by doubling them ("")
- Keep each row on a single line; write line breaks inside a body as \n
- Output ONLY the CSV. No commentary, no markdown fences.

SEQUENCE:
{sequence}"#
    )
}
