// The declared layout of the survey export.

use crate::survey::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnType {
    Integer,
    Text,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SchemaField {
    /// The short name of the column after cleaning.
    pub code: &'static str,
    /// The header the export is expected to carry, when it is known in advance.
    pub raw_header: Option<&'static str>,
    pub kind: ColumnType,
    /// Identity and redundant demographic columns are dropped during cleaning.
    pub retained: bool,
}

const fn metadata(code: &'static str, kind: ColumnType) -> SchemaField {
    SchemaField {
        code,
        raw_header: Some(code),
        kind,
        retained: true,
    }
}

const fn identity(code: &'static str) -> SchemaField {
    SchemaField {
        code,
        raw_header: Some(code),
        kind: ColumnType::Text,
        retained: false,
    }
}

const fn question(code: &'static str, kind: ColumnType) -> SchemaField {
    SchemaField {
        code,
        raw_header: None,
        kind,
        retained: true,
    }
}

const fn dropped_question(code: &'static str) -> SchemaField {
    SchemaField {
        code,
        raw_header: None,
        kind: ColumnType::Text,
        retained: false,
    }
}

use ColumnType::{Integer, Text};

pub const SURVEY_FIELDS: [SchemaField; 39] = [
    metadata("Respondent ID", Integer),
    metadata("Collector ID", Integer),
    metadata("Start Date", Text),
    metadata("End Date", Text),
    identity("IP Address"),
    identity("Email Address"),
    identity("First Name"),
    identity("Last Name"),
    metadata("Custom Data 1", Text),
    metadata("collector_type_source", Text),
    question("Q1", Integer),
    question("Q2", Integer),
    question("Q3", Text),
    question("Q4", Integer),
    question("Q5", Integer),
    question("Q6", Integer),
    question("Q7", Text),
    question("Q8", Integer),
    question("Q9", Text),
    question("Q10", Integer),
    question("Q11", Integer),
    question("Q12", Integer),
    question("Q13", Text),
    question("Q14", Integer),
    question("Q15", Integer),
    question("Q16", Integer),
    question("Q17", Integer),
    question("Q18", Integer),
    question("Q19", Integer),
    question("Q20", Integer),
    question("Q21", Integer),
    question("Q22", Integer),
    question("Q23", Integer),
    question("Q24", Integer),
    question("Q25", Integer),
    question("Q26", Integer),
    dropped_question("Age"),
    question("Device Type", Text),
    dropped_question("Gender"),
];

/// The first question of the feature poll. A respondent that left it blank skipped the poll.
pub const ANCHOR_COLUMN: &str = "Q14";
pub const PAY_COLUMN: &str = "Q24";
pub const BUY_COLUMN: &str = "Q25";

/// The survey column holding the codes of a grouping question.
pub fn grouping_column(grouping: &str) -> Option<&'static str> {
    match grouping {
        PAY_QUESTION => Some(PAY_COLUMN),
        BUY_QUESTION => Some(BUY_COLUMN),
        _ => None,
    }
}

/// Checks the header row against the declared layout.
///
/// Renaming is positional, so the count must match exactly. Headers are only compared
/// for the metadata columns: the question headers are free text.
pub fn validate_headers(headers: &[String]) -> SurveyResult<()> {
    ensure!(
        headers.len() == SURVEY_FIELDS.len(),
        SchemaMismatchSnafu {
            expected: SURVEY_FIELDS.len(),
            found: headers.len(),
        }
    );
    for (position, (field, header)) in SURVEY_FIELDS.iter().zip(headers.iter()).enumerate() {
        if let Some(expected) = field.raw_header {
            let found = header.trim_start_matches('\u{feff}').trim();
            ensure!(
                found == expected,
                SchemaFieldMismatchSnafu {
                    position,
                    expected: expected.to_string(),
                    found: found.to_string(),
                }
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_headers() -> Vec<String> {
        SURVEY_FIELDS
            .iter()
            .map(|f| f.raw_header.unwrap_or("Some question?").to_string())
            .collect()
    }

    #[test]
    fn thirty_three_columns_survive() {
        let retained = SURVEY_FIELDS.iter().filter(|f| f.retained).count();
        assert_eq!(retained, 33);
        let dropped: Vec<&str> = SURVEY_FIELDS
            .iter()
            .filter(|f| !f.retained)
            .map(|f| f.code)
            .collect();
        assert_eq!(
            dropped,
            vec!["IP Address", "Email Address", "First Name", "Last Name", "Age", "Gender"]
        );
    }

    #[test]
    fn comparison_columns_are_integers() {
        for column in ScoringRules::feature_poll().comparison_columns() {
            let f = SURVEY_FIELDS.iter().find(|f| f.code == column).unwrap();
            assert_eq!(f.kind, ColumnType::Integer, "{}", column);
            assert!(f.retained);
        }
        assert_eq!(FEATURE_COMPARISONS[0].0, ANCHOR_COLUMN);
    }

    #[test]
    fn accepts_export_headers() {
        let mut headers = raw_headers();
        headers[0] = format!("\u{feff}{}", headers[0]);
        assert!(validate_headers(&headers).is_ok());
    }

    #[test]
    fn rejects_wrong_width() {
        let mut headers = raw_headers();
        headers.pop();
        assert!(matches!(
            validate_headers(&headers),
            Err(SurveyError::SchemaMismatch {
                expected: 39,
                found: 38
            })
        ));
    }

    #[test]
    fn rejects_shifted_columns() {
        let mut headers = raw_headers();
        headers.remove(4);
        headers.push("Gender".to_string());
        match validate_headers(&headers) {
            Err(SurveyError::SchemaFieldMismatch { position, .. }) => assert_eq!(position, 4),
            x => panic!("unexpected result {:?}", x),
        }
    }
}
