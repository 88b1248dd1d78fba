use serde::Serialize;

use super::cleanup::clean_structured_response;
use super::extractor::{extract_step_estimate, StepEstimate};
use super::parser::{parse_step_table, ParseStrategy};
use super::prompt::{build_conversion_prompt, conversion_sampling, CONVERSION_SYSTEM_PROMPT};
use super::validation::{validate_table, ValidationWarning};
use super::ConversionError;
use crate::models::{ProviderKind, SequenceDraft, StepRecord};
use crate::pipeline::generation::{GenerationRequest, GeneratorGateway};

/// Outcome of converting one draft into a step table.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub steps: Vec<StepRecord>,
    /// Advisory only; a conversion with warnings is still usable.
    pub warnings: Vec<ValidationWarning>,
    pub estimate: StepEstimate,
    pub strategy: ParseStrategy,
    pub skipped_rows: usize,
    /// Generator output after cleanup, kept for diagnosis.
    pub cleaned_text: String,
    /// Backend that produced the table. `None` for locally supplied text.
    pub provider: Option<ProviderKind>,
}

/// Converts drafted sequences into step tables:
/// estimate → prompt → generator → cleanup → tiered parse → cross-validate
///
/// Generator failures are not retried here beyond the gateway's own
/// failover; they propagate to the caller.
pub struct SequenceNormalizer<'g> {
    gateway: &'g mut GeneratorGateway,
}

impl<'g> SequenceNormalizer<'g> {
    pub fn new(gateway: &'g mut GeneratorGateway) -> Self {
        Self { gateway }
    }

    pub fn convert(&mut self, draft: &SequenceDraft) -> Result<Conversion, ConversionError> {
        let _span = tracing::info_span!(
            "convert_sequence",
            lane = %draft.lane_id,
            cadence = %draft.cadence
        )
        .entered();

        if draft.text.trim().is_empty() {
            return Err(ConversionError::EmptySequence);
        }

        // Ground truth comes from the draft itself, not from the generator.
        let estimate = extract_step_estimate(&draft.text);

        let prompt = build_conversion_prompt(&draft.text, draft.cadence);
        let request = GenerationRequest {
            system: CONVERSION_SYSTEM_PROMPT,
            prompt: &prompt,
            params: conversion_sampling(draft.cadence),
        };
        let generated = self.gateway.generate(&request)?;

        let mut conversion = normalize_response(&generated.text, &estimate)?;
        conversion.provider = Some(generated.provider);

        tracing::info!(
            provider = %generated.provider,
            rows = conversion.steps.len(),
            observed_max = estimate.observed_max_step,
            strategy = %conversion.strategy,
            warnings = conversion.warnings.len(),
            "Sequence converted"
        );
        Ok(conversion)
    }
}

/// Clean, parse and validate a structured response against an estimate.
/// Pure function of its inputs.
pub fn normalize_response(
    raw: &str,
    estimate: &StepEstimate,
) -> Result<Conversion, ConversionError> {
    let cleaned_text = clean_structured_response(raw);
    let table = parse_step_table(&cleaned_text).inspect_err(|e| {
        tracing::warn!(
            raw_len = raw.len(),
            cleaned_len = cleaned_text.len(),
            error = %e,
            "Structured output could not be parsed"
        );
    })?;
    let warnings = validate_table(&table, estimate);

    Ok(Conversion {
        steps: table.rows,
        warnings,
        estimate: estimate.clone(),
        strategy: table.strategy,
        skipped_rows: table.skipped_rows,
        cleaned_text,
        provider: None,
    })
}
