// Tiered parsing of the cleaned step table.
//
// Strategies run from strictest to most forgiving and the first one that
// yields a recognizable header plus at least one usable row wins.

use std::fmt;

use csv::ReaderBuilder;
use serde::Serialize;

use super::{ConversionError, PARSE_SNIPPET_CHARS};
use crate::models::{StepRecord, StepType};
use crate::pipeline::generation::truncate_chars;

/// Records with fewer fields are treated as noise by the lenient strategies.
const MIN_LENIENT_FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Standard CSV, malformed rows skipped.
    Strict,
    /// Standard CSV that also honors backslash-escaped quotes.
    QuoteEnforced,
    /// Ragged rows: short rows padded, extra fields folded into the body.
    Flexible,
    /// Line splitter for rows where every field is double-quoted.
    QuoteAll,
}

impl ParseStrategy {
    /// Attempt order.
    pub const CASCADE: [ParseStrategy; 4] = [
        Self::Strict,
        Self::QuoteEnforced,
        Self::Flexible,
        Self::QuoteAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::QuoteEnforced => "quote_enforced",
            Self::Flexible => "flexible",
            Self::QuoteAll => "quote_all",
        }
    }

    fn is_lenient(&self) -> bool {
        matches!(self, Self::Flexible | Self::QuoteAll)
    }
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step_type cell that named no known channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedStepType {
    /// 1-based position among the parsed rows.
    pub row: usize,
    pub value: String,
}

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTable {
    pub rows: Vec<StepRecord>,
    pub strategy: ParseStrategy,
    /// Rows dropped as malformed (blank rows are not counted).
    pub skipped_rows: usize,
    pub unrecognized_step_types: Vec<UnrecognizedStepType>,
}

/// Parse cleaned conversion output into step rows, trying each strategy in
/// turn. Fails with a diagnostic snippet when no strategy succeeds.
pub fn parse_step_table(cleaned: &str) -> Result<ParsedTable, ConversionError> {
    let mut last_reason = String::from("empty input");

    for strategy in ParseStrategy::CASCADE {
        match run_strategy(strategy, cleaned) {
            Ok(table) => {
                tracing::debug!(
                    strategy = %strategy,
                    rows = table.rows.len(),
                    skipped = table.skipped_rows,
                    "Parsed step table"
                );
                return Ok(table);
            }
            Err(reason) => {
                tracing::debug!(strategy = %strategy, reason = %reason, "Parse strategy failed");
                last_reason = reason;
            }
        }
    }

    Err(ConversionError::StructuredParse {
        reason: last_reason,
        snippet: truncate_chars(cleaned, PARSE_SNIPPET_CHARS),
    })
}

fn run_strategy(strategy: ParseStrategy, text: &str) -> Result<ParsedTable, String> {
    let raw = match strategy {
        ParseStrategy::Strict => read_csv(&ReaderBuilder::new(), text)?,
        ParseStrategy::QuoteEnforced => {
            let mut builder = ReaderBuilder::new();
            builder
                .quoting(true)
                .quote(b'"')
                .double_quote(true)
                .escape(Some(b'\\'));
            read_csv(&builder, text)?
        }
        ParseStrategy::Flexible => {
            let mut builder = ReaderBuilder::new();
            builder.flexible(true);
            read_csv(&builder, text)?
        }
        ParseStrategy::QuoteAll => read_quoted_lines(text)?,
    };
    tabulate(raw, strategy)
}

// ═══════════════════════════════════════════════════════════
// Readers
// ═══════════════════════════════════════════════════════════

/// Header and data records before column mapping.
struct RawTable {
    header: Vec<String>,
    records: Vec<Vec<String>>,
    skipped: usize,
}

fn read_csv(builder: &ReaderBuilder, text: &str) -> Result<RawTable, String> {
    let mut reader = builder.from_reader(text.as_bytes());
    let header = reader
        .headers()
        .map_err(|e| format!("unreadable header: {e}"))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0;
    for result in reader.records() {
        match result {
            Ok(record) => records.push(record.iter().map(str::to_string).collect()),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed row");
                skipped += 1;
            }
        }
    }

    Ok(RawTable {
        header,
        records,
        skipped,
    })
}

fn read_quoted_lines(text: &str) -> Result<RawTable, String> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .map(split_quoted_line)
        .ok_or_else(|| "empty input".to_string())?;

    Ok(RawTable {
        header,
        records: lines.map(split_quoted_line).collect(),
        skipped: 0,
    })
}

/// Split one line whose text fields are each wrapped in double quotes.
///
/// Leading unquoted fields (step numbers, days) are split on commas. From the
/// first quoted field on, the rest of the line is split on `","` with the
/// outer quotes trimmed, so stray quotes inside a field survive intact.
/// Doubled quotes are unescaped.
fn split_quoted_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut rest = line.trim();

    loop {
        if let Some(quoted) = rest.strip_prefix('"') {
            let quoted = quoted.strip_suffix('"').unwrap_or(quoted);
            fields.extend(quoted.split("\",\"").map(|f| f.replace("\"\"", "\"")));
            return fields;
        }
        match rest.split_once(',') {
            Some((head, tail)) => {
                fields.push(head.trim().to_string());
                rest = tail.trim_start();
            }
            None => {
                fields.push(rest.trim().to_string());
                return fields;
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Column mapping
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    StepNumber,
    StepDay,
    StepType,
    Subject,
    Body,
}

impl Column {
    fn from_header(name: &str) -> Option<Self> {
        let key: String = name
            .trim()
            .trim_start_matches('\u{feff}')
            .trim_matches('"')
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match key.as_str() {
            "step_number" | "step" | "step_no" | "step_num" => Some(Self::StepNumber),
            "step_day" | "day" => Some(Self::StepDay),
            "step_type" | "type" | "channel" => Some(Self::StepType),
            "subject" | "subject_line" => Some(Self::Subject),
            "body" | "message" | "content" => Some(Self::Body),
            _ => None,
        }
    }
}

/// Which column each header position feeds. Unknown and repeated header
/// names map to nothing.
struct ColumnMap {
    slots: Vec<Option<Column>>,
    /// Position that absorbs surplus fields of an over-long record.
    merge_at: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Option<Self> {
        let mut slots: Vec<Option<Column>> = Vec::with_capacity(header.len());
        for name in header {
            let column = Column::from_header(name).filter(|c| !slots.contains(&Some(*c)));
            slots.push(column);
        }
        if slots.iter().all(Option::is_none) {
            return None;
        }
        let merge_at = slots
            .iter()
            .position(|s| *s == Some(Column::Body))
            .unwrap_or(slots.len() - 1);
        Some(Self { slots, merge_at })
    }

    /// Pad short records and fold surplus fields back into the body.
    fn fit(&self, mut fields: Vec<String>) -> Vec<String> {
        let width = self.slots.len();
        if fields.len() > width {
            let extra = fields.len() - width;
            let merged = fields
                .drain(self.merge_at..=self.merge_at + extra)
                .collect::<Vec<_>>()
                .join(",");
            fields.insert(self.merge_at, merged);
        }
        fields.resize(width, String::new());
        fields
    }

    /// Map a fitted record to a step. Also returns the raw step_type text
    /// when it named no known channel.
    fn map_record(&self, fields: &[String]) -> (StepRecord, Option<String>) {
        let mut record = StepRecord {
            step_number: None,
            step_day: None,
            step_type: None,
            subject: String::new(),
            body: String::new(),
        };
        let mut unrecognized = None;

        for (slot, value) in self.slots.iter().zip(fields) {
            let value = value.trim();
            match slot {
                Some(Column::StepNumber) => {
                    record.step_number = parse_decorated_int(value).filter(|n| *n > 0)
                }
                Some(Column::StepDay) => record.step_day = parse_decorated_int(value),
                Some(Column::StepType) => {
                    record.step_type = StepType::parse_lenient(value);
                    if record.step_type.is_none() && !value.is_empty() {
                        unrecognized = Some(value.to_string());
                    }
                }
                Some(Column::Subject) => record.subject = value.to_string(),
                Some(Column::Body) => record.body = value.to_string(),
                None => {}
            }
        }

        (record, unrecognized)
    }
}

/// First run of ASCII digits in `value`: "Day 4" and "4.0" both give 4.
fn parse_decorated_int(value: &str) -> Option<u32> {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn tabulate(raw: RawTable, strategy: ParseStrategy) -> Result<ParsedTable, String> {
    let columns = ColumnMap::from_header(&raw.header)
        .ok_or_else(|| format!("no recognized columns in header '{}'", raw.header.join(",")))?;

    let mut table = ParsedTable {
        rows: Vec::new(),
        strategy,
        skipped_rows: raw.skipped,
        unrecognized_step_types: Vec::new(),
    };

    for fields in raw.records {
        if strategy.is_lenient() && fields.len() < MIN_LENIENT_FIELDS {
            if fields.iter().any(|f| !f.trim().is_empty()) {
                table.skipped_rows += 1;
            }
            continue;
        }

        let fields = columns.fit(fields);
        let (record, unrecognized) = columns.map_record(&fields);
        if record.is_blank() {
            continue;
        }
        if let Some(value) = unrecognized {
            table.unrecognized_step_types.push(UnrecognizedStepType {
                row: table.rows.len() + 1,
                value,
            });
        }
        table.rows.push(record);
    }

    if table.rows.is_empty() {
        return Err("no usable rows".into());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "step_number,step_day,step_type,subject,body";

    fn table(rows: &[&str]) -> String {
        std::iter::once(HEADER)
            .chain(rows.iter().copied())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn numbers(parsed: &ParsedTable) -> Vec<Option<u32>> {
        parsed.rows.iter().map(|r| r.step_number).collect()
    }

    #[test]
    fn well_formed_table_parses_strictly() {
        let text = table(&[
            r#"1,1,Email,"Quick question","Hi Dana, saw the news.""#,
            r#"2,2,LinkedIn,,"Connecting after my note""#,
            r#"3,4,Phone,,"Call script""#,
        ]);
        let parsed = parse_step_table(&text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Strict);
        assert_eq!(numbers(&parsed), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(parsed.rows[0].subject, "Quick question");
        assert_eq!(parsed.rows[0].body, "Hi Dana, saw the news.");
        assert_eq!(parsed.rows[1].step_type, Some(StepType::LinkedIn));
        assert_eq!(parsed.rows[2].step_day, Some(4));
        assert_eq!(parsed.skipped_rows, 0);
        assert!(parsed.unrecognized_step_types.is_empty());
    }

    #[test]
    fn strict_skips_ragged_rows_but_keeps_the_rest() {
        let text = table(&[
            r#"1,1,Email,"Hi","Body one""#,
            "2,3,Email,Hi,Body, with, commas",
            r#"3,5,Email,"Hi","Body three""#,
        ]);
        let parsed = parse_step_table(&text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Strict);
        assert_eq!(numbers(&parsed), vec![Some(1), Some(3)]);
        assert_eq!(parsed.skipped_rows, 1);
    }

    #[test]
    fn unbalanced_quote_costs_only_its_own_row() {
        let rows: Vec<String> = (1..=8u32)
            .map(|n| match n {
                3 => r#"3,4,Email,"S3,"B3""#.to_string(),
                n => format!(r#"{n},{n},Email,"S{n}","B{n}""#),
            })
            .collect();
        let text = table(&rows.iter().map(String::as_str).collect::<Vec<_>>());

        let parsed = parse_step_table(&text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Strict);
        assert_eq!(
            numbers(&parsed),
            vec![Some(1), Some(2), Some(4), Some(5), Some(6), Some(7), Some(8)]
        );
        assert_eq!(parsed.skipped_rows, 1);
        assert_eq!(parsed.rows[2].body, "B4");
    }

    #[test]
    fn flexible_folds_extra_fields_into_body() {
        let text = table(&[
            "1,1,Email,Hi,Hello, world, again",
            "2,3,Email,Re,Short, note",
        ]);
        let parsed = parse_step_table(&text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Flexible);
        assert_eq!(parsed.rows[0].body, "Hello, world, again");
        assert_eq!(parsed.rows[1].body, "Short, note");
    }

    #[test]
    fn flexible_pads_short_rows_and_drops_noise() {
        let raw = RawTable {
            header: HEADER.split(',').map(str::to_string).collect(),
            records: vec![
                vec!["1".into(), "1".into(), "Email".into()],
                vec!["Thanks!".into()],
            ],
            skipped: 0,
        };
        let parsed = tabulate(raw, ParseStrategy::Flexible).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].body, "");
        assert_eq!(parsed.skipped_rows, 1);
    }

    #[test]
    fn quote_enforced_honors_backslash_escapes() {
        let text = table(&[r#"1,1,Email,"Say \"hi\"","Body""#]);
        let parsed = run_strategy(ParseStrategy::QuoteEnforced, &text).unwrap();
        assert_eq!(parsed.rows[0].subject, r#"Say "hi""#);
    }

    #[test]
    fn quote_all_splitter_keeps_inner_quotes() {
        let fields = split_quoted_line(r#""1","1","Email","He said "go" twice","Body, with comma""#);
        assert_eq!(
            fields,
            vec!["1", "1", "Email", r#"He said "go" twice"#, "Body, with comma"]
        );
    }

    #[test]
    fn quote_all_splitter_handles_unquoted_prefix() {
        let fields = split_quoted_line(r#"2,3,LinkedIn,"","It""s me""#);
        assert_eq!(fields, vec!["2", "3", "LinkedIn", "", "It\"s me"]);
    }

    #[test]
    fn quote_all_strategy_parses_fully_quoted_table() {
        let text = concat!(
            "\"step_number\",\"step_day\",\"step_type\",\"subject\",\"body\"\n",
            "\"1\",\"1\",\"Email\",\"The \"fast\" path\",\"Hi\"\n",
        );
        let parsed = run_strategy(ParseStrategy::QuoteAll, text).unwrap();
        assert_eq!(parsed.rows[0].subject, "The \"fast\" path");
        assert_eq!(parsed.rows[0].step_type, Some(StepType::Email));
    }

    #[test]
    fn headers_match_case_insensitively_and_by_alias() {
        let text = "Step Number,Day,Type,Subject,Message\n1,1,email,Hi,Hello";
        let parsed = parse_step_table(text).unwrap();
        let row = &parsed.rows[0];
        assert_eq!(row.step_number, Some(1));
        assert_eq!(row.step_day, Some(1));
        assert_eq!(row.step_type, Some(StepType::Email));
        assert_eq!(row.body, "Hello");
    }

    #[test]
    fn decorated_integers_are_read() {
        let text = table(&["Step 3,Day 4,Email,Hi,Body", "4.0,7.0,Email,Hi,Body"]);
        let parsed = parse_step_table(&text).unwrap();
        assert_eq!(numbers(&parsed), vec![Some(3), Some(4)]);
        assert_eq!(parsed.rows[0].step_day, Some(4));
        assert_eq!(parsed.rows[1].step_day, Some(7));
    }

    #[test]
    fn zero_or_missing_step_number_is_none() {
        let text = table(&["0,1,Email,Hi,Body", "n/a,2,Email,Hi,Body"]);
        let parsed = parse_step_table(&text).unwrap();
        assert_eq!(numbers(&parsed), vec![None, None]);
    }

    #[test]
    fn unknown_step_type_is_recorded() {
        let text = table(&["1,1,Email,Hi,Body", "2,3,Carrier pigeon,,Coo"]);
        let parsed = parse_step_table(&text).unwrap();
        assert_eq!(parsed.rows[1].step_type, None);
        assert_eq!(
            parsed.unrecognized_step_types,
            vec![UnrecognizedStepType {
                row: 2,
                value: "Carrier pigeon".into()
            }]
        );
    }

    #[test]
    fn blank_rows_are_discarded() {
        let text = table(&["1,1,Email,Hi,Body", ",,,,", " , , , , "]);
        let parsed = parse_step_table(&text).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped_rows, 0);
    }

    #[test]
    fn missing_columns_stay_empty() {
        let parsed = parse_step_table("step_number,step_day,body\n1,1,Hello").unwrap();
        assert_eq!(parsed.rows[0].subject, "");
        assert_eq!(parsed.rows[0].step_type, None);
        assert!(parsed.unrecognized_step_types.is_empty());
    }

    #[test]
    fn header_without_rows_fails() {
        let err = parse_step_table(HEADER).unwrap_err();
        assert!(matches!(err, ConversionError::StructuredParse { .. }));
    }

    #[test]
    fn prose_fails_with_snippet() {
        let prose = "I'm sorry, I can't help with that request.";
        match parse_step_table(prose) {
            Err(ConversionError::StructuredParse { snippet, .. }) => assert_eq!(snippet, prose),
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn failure_snippet_is_capped() {
        let long = "x".repeat(PARSE_SNIPPET_CHARS + 100);
        match parse_step_table(&long) {
            Err(ConversionError::StructuredParse { snippet, reason }) => {
                assert_eq!(snippet.chars().count(), PARSE_SNIPPET_CHARS);
                assert!(!reason.is_empty());
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[test]
    fn fit_merges_surplus_into_body_column() {
        let columns = ColumnMap::from_header(
            &HEADER.split(',').map(str::to_string).collect::<Vec<_>>(),
        )
        .unwrap();
        let fitted = columns.fit(
            ["1", "1", "Email", "Hi", "a", "b", "c"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        assert_eq!(fitted, vec!["1", "1", "Email", "Hi", "a,b,c"]);
    }
}
