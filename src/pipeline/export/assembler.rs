use serde::Serialize;

use crate::models::{ProspectInfo, StepRecord, StepType};

/// Export columns, in file order. Prospect attributes first, then step
/// attributes in their canonical order.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "email",
    "first_name",
    "last_name",
    "title",
    "company",
    "sequence_name",
    "step_number",
    "step_day",
    "step_type",
    "subject",
    "body",
];

/// One sequencer row: a step joined with the prospect attributes.
///
/// Field order is the column order; absent values serialize as empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub company: String,
    pub sequence_name: String,
    pub step_number: Option<u32>,
    pub step_day: Option<u32>,
    pub step_type: Option<StepType>,
    pub subject: String,
    pub body: String,
}

/// Label that groups the rows of one export in the sequencer.
pub fn sequence_label(product: &str, prospect: &ProspectInfo) -> String {
    format!(
        "{product} Outbound - {}",
        prospect.company_name().unwrap_or("Unknown")
    )
}

/// Join steps with prospect attributes. The title falls back to
/// `persona_name` when the prospect has none.
pub fn assemble_export(
    steps: &[StepRecord],
    prospect: &ProspectInfo,
    persona_name: Option<&str>,
    product: &str,
) -> Vec<ExportRecord> {
    let prospect = match persona_name {
        Some(name) => prospect.with_default_title(name),
        None => prospect.clone(),
    };
    let text = |value: &Option<String>| value.as_deref().map(str::trim).unwrap_or("").to_string();
    let sequence_name = sequence_label(product, &prospect);

    steps
        .iter()
        .map(|step| ExportRecord {
            email: text(&prospect.email),
            first_name: text(&prospect.first_name),
            last_name: text(&prospect.last_name),
            title: text(&prospect.title),
            company: text(&prospect.company),
            sequence_name: sequence_name.clone(),
            step_number: step.step_number,
            step_day: step.step_day,
            step_type: step.step_type,
            subject: step.subject.clone(),
            body: step.body.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(n: u32) -> StepRecord {
        StepRecord {
            step_number: Some(n),
            step_day: Some(n * 2),
            step_type: Some(StepType::Email),
            subject: format!("Subject {n}"),
            body: format!("Body {n}"),
        }
    }

    #[test]
    fn one_record_per_step_with_prospect_replicated() {
        let prospect = ProspectInfo {
            email: Some("dana@acme.io".into()),
            first_name: Some("Dana".into()),
            company: Some("Acme".into()),
            ..Default::default()
        };
        let records = assemble_export(&[step(1), step(2)], &prospect, Some("CTO"), "Cursor");

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.email, "dana@acme.io");
            assert_eq!(record.title, "CTO");
            assert_eq!(record.last_name, "");
            assert_eq!(record.sequence_name, "Cursor Outbound - Acme");
        }
        assert_eq!(records[1].step_day, Some(4));
    }

    #[test]
    fn explicit_title_wins_over_persona() {
        let prospect = ProspectInfo {
            title: Some("Head of Platform".into()),
            ..Default::default()
        };
        let records = assemble_export(&[step(1)], &prospect, Some("CTO"), "Cursor");
        assert_eq!(records[0].title, "Head of Platform");
        assert_eq!(records[0].sequence_name, "Cursor Outbound - Unknown");
    }

    #[test]
    fn no_persona_leaves_title_empty() {
        let records = assemble_export(&[step(1)], &ProspectInfo::default(), None, "Cursor");
        assert_eq!(records[0].title, "");
    }

    #[test]
    fn record_fields_cover_every_column() {
        let value = serde_json::to_value(&assemble_export(
            &[step(1)],
            &ProspectInfo::default(),
            None,
            "Cursor",
        )[0])
        .unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        let mut expected = EXPORT_COLUMNS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }
}
