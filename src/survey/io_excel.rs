// Primitives for reading Excel exports of the survey.

use calamine::DataType;

use crate::survey::{io_common::simplify_file_name, *};

pub fn read_excel_survey(
    path: &str,
    worksheet_name_o: Option<&str>,
) -> SurveyResult<RawSurveyTable> {
    debug!(
        "read_excel_survey: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let wrange_o = match worksheet_name_o {
        // A worksheet name was provided, use it.
        Some(worksheet_name) => workbook.worksheet_range(worksheet_name),
        None => workbook.worksheet_range_at(0),
    };
    let wrange = wrange_o
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    let mut iter = wrange.rows();
    let headers: Vec<String> = match iter.next() {
        Some(row) => row.iter().map(read_cell).collect(),
        None => Vec::new(),
    };
    debug!("read_excel_survey: header: {:?}", headers);
    let rows: Vec<Vec<String>> = iter.map(|row| row.iter().map(read_cell).collect()).collect();

    let name = simplify_file_name(path);
    info!(
        "read_excel_survey: {}: {:?} columns, {:?} rows",
        name,
        headers.len(),
        rows.len()
    );
    Ok(RawSurveyTable {
        source: name,
        headers,
        rows,
    })
}

// Renders a cell the way it would appear in a CSV export.
fn read_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        // Whole numbers are stored as floats by most spreadsheet tools.
        DataType::Float(f) if in_i64_range(*f) && f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(f) => f.to_string(),
        DataType::Empty => "".to_string(),
        other => {
            warn!("read_cell: treating cell {:?} as blank", other);
            "".to_string()
        }
    }
}

// `i64::MAX as f64` rounds up to 2^63, hence the strict upper bound.
fn in_i64_range(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_like_csv() {
        assert_eq!(read_cell(&DataType::Float(3.0)), "3");
        assert_eq!(read_cell(&DataType::Float(2.5)), "2.5");
        assert_eq!(read_cell(&DataType::Int(7)), "7");
        assert_eq!(read_cell(&DataType::String("Yes".to_string())), "Yes");
        assert_eq!(read_cell(&DataType::Empty), "");
    }

    #[test]
    fn large_floats_do_not_saturate() {
        assert_eq!(read_cell(&DataType::Float(1e30)), 1e30f64.to_string());
        assert_ne!(read_cell(&DataType::Float(1e30)), i64::MAX.to_string());
        assert_eq!(read_cell(&DataType::Float(-4.0e9)), "-4000000000");
    }

    fn control_xlsx() -> String {
        format!(
            "{}/tests/data/excel_study/control.xlsx",
            env!("CARGO_MANIFEST_DIR")
        )
    }

    #[test]
    fn reads_first_worksheet() {
        let t = read_excel_survey(&control_xlsx(), None).unwrap();
        assert_eq!(t.source, "control.xlsx");
        assert_eq!(t.headers.len(), 39);
        assert_eq!(t.headers[0], "Respondent ID");
        // Label row and nine respondents.
        assert_eq!(t.rows.len(), 10);
        assert_eq!(t.rows[1][0], "114000000000");
        assert_eq!(t.rows[1][4], "");
        assert_eq!(t.rows[1][12], "Title A, Title B");
    }

    #[test]
    fn unknown_worksheet() {
        assert!(matches!(
            read_excel_survey(&control_xlsx(), Some("Form1")),
            Err(SurveyError::EmptyExcel { .. })
        ));
    }

    #[test]
    fn missing_workbook() {
        assert!(matches!(
            read_excel_survey("/nonexistent/survey.xlsx", None),
            Err(SurveyError::OpeningExcel { .. })
        ));
    }
}
