use crate::survey::{schema::*, *};

/// A typed cell of the cleaned survey.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Cell {
    Integer(i64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// The survey after cleaning: identity columns removed, the label row removed, respondents
/// that skipped the feature poll removed, and every cell typed.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct CleanSurveyTable {
    pub source: String,
    pub columns: Vec<String>,
    pub kinds: Vec<ColumnType>,
    /// Position of each row in the raw data (the label row is row 0).
    pub index: Vec<usize>,
    pub rows: Vec<Vec<Cell>>,
    pub index_name: String,
    pub columns_name: String,
}

impl CleanSurveyTable {
    pub fn column_position(&self, code: &str) -> SurveyResult<usize> {
        match self.columns.iter().position(|c| c == code) {
            Some(idx) => Ok(idx),
            None => whatever!("{}: missing column {:?}", self.source, code),
        }
    }

    #[cfg(test)]
    pub fn column(&self, code: &str) -> SurveyResult<Vec<&Cell>> {
        let idx = self.column_position(code)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Cleans a raw export. See the module documentation of the schema for the layout.
pub fn clean_survey(raw: &RawSurveyTable) -> SurveyResult<CleanSurveyTable> {
    validate_headers(&raw.headers)?;
    for (idx, row) in raw.rows.iter().enumerate() {
        ensure!(
            row.len() == SURVEY_FIELDS.len(),
            RowWidthSnafu {
                row: idx,
                expected: SURVEY_FIELDS.len(),
                found: row.len(),
            }
        );
    }

    let retained: Vec<(usize, &SchemaField)> = SURVEY_FIELDS
        .iter()
        .enumerate()
        .filter(|(_, f)| f.retained)
        .collect();
    let anchor_idx = SURVEY_FIELDS
        .iter()
        .position(|f| f.code == ANCHOR_COLUMN)
        .whatever_context::<_, SurveyError>(format!("anchor column {} is not declared", ANCHOR_COLUMN))?;

    // The export repeats the answer labels on the first data row.
    ensure!(!raw.rows.is_empty(), MissingLabelRowSnafu {});
    debug!("clean_survey: dropping label row {:?}", raw.rows[0]);

    let mut index: Vec<usize> = Vec::new();
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut skipped_poll: usize = 0;
    for (row_idx, row) in raw.rows.iter().enumerate().skip(1) {
        if row[anchor_idx].trim().is_empty() {
            debug!("clean_survey: row {:?} skipped the feature poll", row_idx);
            skipped_poll += 1;
            continue;
        }
        let mut cells: Vec<Cell> = Vec::with_capacity(retained.len());
        for (col_idx, field) in retained.iter() {
            cells.push(cast_cell(&row[*col_idx], field, row_idx)?);
        }
        index.push(row_idx);
        rows.push(cells);
    }
    if skipped_poll > 0 {
        warn!(
            "clean_survey: {}: {:?} respondents skipped the feature poll",
            raw.source, skipped_poll
        );
    }
    info!(
        "clean_survey: {}: kept {:?} of {:?} respondents",
        raw.source,
        rows.len(),
        raw.rows.len() - 1
    );

    Ok(CleanSurveyTable {
        source: raw.source.clone(),
        columns: retained.iter().map(|(_, f)| f.code.to_string()).collect(),
        kinds: retained.iter().map(|(_, f)| f.kind).collect(),
        index,
        rows,
        index_name: "respondents".to_string(),
        columns_name: "questions".to_string(),
    })
}

fn cast_cell(value: &str, field: &SchemaField, row: usize) -> SurveyResult<Cell> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Cell::Missing);
    }
    match field.kind {
        ColumnType::Text => Ok(Cell::Text(value.to_string())),
        ColumnType::Integer => parse_integer(trimmed).map(Cell::Integer).context(
            CastFailureSnafu {
                row,
                column: field.code,
                value,
            },
        ),
    }
}

/// Reads an integer, also accepting the `2.0` rendering of spreadsheet tools.
fn parse_integer(s: &str) -> Option<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let (whole, fraction) = s.split_once('.')?;
    if !fraction.is_empty() && fraction.chars().all(|c| c == '0') {
        whole.parse::<i64>().ok()
    } else {
        None
    }
}
