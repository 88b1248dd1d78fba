use std::io;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use super::{export_file_name, ExportError, ExportRecord, EXPORT_COLUMNS};

/// Serialize records as quoted CSV. The header row is always written,
/// even when there are no records.
pub fn write_records<W: io::Write>(writer: W, records: &[ExportRecord]) -> Result<(), ExportError> {
    let mut csv = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(EXPORT_COLUMNS)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the export file for `company` into `dir`, creating the directory
/// when missing. Returns the written path.
///
/// Records are serialized in memory first; the file is only created once
/// the whole table has been rendered.
pub fn write_export(
    dir: &Path,
    company: Option<&str>,
    records: &[ExportRecord],
) -> Result<PathBuf, ExportError> {
    let mut rendered = Vec::new();
    write_records(&mut rendered, records)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(company));
    std::fs::write(&path, rendered)?;

    tracing::info!(
        path = %path.display(),
        rows = records.len(),
        "Export written"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProspectInfo, StepRecord, StepType};
    use crate::pipeline::export::assemble_export;

    const HEADER_LINE: &str =
        "email,first_name,last_name,title,company,sequence_name,step_number,step_day,step_type,subject,body";

    fn render(records: &[ExportRecord]) -> String {
        let mut buf = Vec::new();
        write_records(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn records(prospect: &ProspectInfo) -> Vec<ExportRecord> {
        let steps = vec![
            StepRecord {
                step_number: Some(1),
                step_day: Some(1),
                step_type: Some(StepType::Email),
                subject: "Quick, short question".into(),
                body: "Hi Dana,\nshe said \"go\".".into(),
            },
            StepRecord {
                step_number: Some(2),
                step_day: None,
                step_type: None,
                subject: String::new(),
                body: "Connect".into(),
            },
        ];
        assemble_export(&steps, prospect, Some("CTO"), "Cursor")
    }

    #[test]
    fn empty_export_still_has_header() {
        assert_eq!(render(&[]), format!("{HEADER_LINE}\n"));
    }

    #[test]
    fn rows_follow_fixed_column_order() {
        let prospect = ProspectInfo {
            email: Some("dana@acme.io".into()),
            company: Some("Acme".into()),
            ..Default::default()
        };
        let out = render(&records(&prospect));
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some(HEADER_LINE));
        assert_eq!(
            lines.next(),
            Some("dana@acme.io,,,CTO,Acme,Cursor Outbound - Acme,1,1,Email,\"Quick, short question\",\"Hi Dana,")
        );
    }

    #[test]
    fn column_set_is_stable_for_any_prospect_shape() {
        let variants = [
            ProspectInfo::default(),
            ProspectInfo {
                email: Some("a@b.co".into()),
                ..Default::default()
            },
            ProspectInfo {
                first_name: Some("Dana".into()),
                last_name: Some("Reyes".into()),
                title: Some("VP Eng".into()),
                company: Some("Acme".into()),
                email: Some("dana@acme.io".into()),
            },
        ];
        for prospect in variants {
            let out = render(&records(&prospect));
            let mut reader = csv::Reader::from_reader(out.as_bytes());
            assert_eq!(reader.headers().unwrap().iter().collect::<Vec<_>>(), EXPORT_COLUMNS);
            for row in reader.records() {
                assert_eq!(row.unwrap().len(), EXPORT_COLUMNS.len());
            }
        }
    }

    #[test]
    fn missing_step_fields_render_empty() {
        let out = render(&records(&ProspectInfo::default()));
        let mut reader = csv::Reader::from_reader(out.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(&rows[1][7], "");
        assert_eq!(&rows[1][8], "");
        assert_eq!(&rows[0][10], "Hi Dana,\nshe said \"go\".");
    }

    #[test]
    fn writes_named_file_and_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("exports");
        let prospect = ProspectInfo {
            company: Some("Acme Corp".into()),
            ..Default::default()
        };

        let path = write_export(&target, prospect.company_name(), &records(&prospect)).unwrap();
        assert_eq!(path, target.join("outreach_sequence_acme_corp.csv"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(HEADER_LINE));
        assert_eq!(csv::Reader::from_path(&path).unwrap().records().count(), 2);
    }

    #[test]
    fn failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("outreach_sequence_acme.csv");
        std::fs::create_dir(&blocked).unwrap();

        let err = write_export(dir.path(), Some("Acme"), &records(&ProspectInfo::default())).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
        assert!(blocked.is_dir());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn rewrite_replaces_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let prospect = ProspectInfo::default();
        write_export(dir.path(), None, &records(&prospect)).unwrap();

        let path = write_export(dir.path(), None, &[]).unwrap();
        assert_eq!(path, dir.path().join("outreach_sequence_export.csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{HEADER_LINE}\n"));
    }
}
