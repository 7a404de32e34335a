// Primitives for reading CSV files.

use std::io::Read;

use crate::survey::{io_common::simplify_file_name, *};

pub fn read_csv_survey(path: &str) -> SurveyResult<RawSurveyTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;
    read_records(rdr, &simplify_file_name(path))
}

/// Reads a survey from any reader. The first record is the header row.
#[cfg(test)]
pub fn read_csv_survey_from<R: Read>(reader: R, name: &str) -> SurveyResult<RawSurveyTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    read_records(rdr, name)
}

fn read_records<R: Read>(rdr: csv::Reader<R>, name: &str) -> SurveyResult<RawSurveyTable> {
    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu {
            path: name.to_string(),
            lineno,
        })?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if headers.is_none() {
            debug!("read_csv_survey: {}: header: {:?}", name, cells);
            headers = Some(cells);
        } else {
            rows.push(cells);
        }
    }
    let headers = headers.unwrap_or_default();
    info!(
        "read_csv_survey: {}: {:?} columns, {:?} rows",
        name,
        headers.len(),
        rows.len()
    );
    Ok(RawSurveyTable {
        source: name.to_string(),
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_split_from_rows() {
        let data = "a,b,c\nx,y,z\n1,,3\n";
        let t = read_csv_survey_from(data.as_bytes(), "mem").unwrap();
        assert_eq!(t.headers, vec!["a", "b", "c"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1], vec!["1", "", "3"]);
    }

    #[test]
    fn ragged_rows_are_kept_for_the_cleaner() {
        let data = "a,b,c\n1,2\n";
        let t = read_csv_survey_from(data.as_bytes(), "mem").unwrap();
        assert_eq!(t.rows[0].len(), 2);
    }

    #[test]
    fn empty_input() {
        let t = read_csv_survey_from("".as_bytes(), "mem").unwrap();
        assert!(t.headers.is_empty());
        assert!(t.rows.is_empty());
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_survey("/nonexistent/survey.csv"),
            Err(SurveyError::OpeningCsv { .. })
        ));
    }
}
