use log::{debug, info, warn};

use feature_poll::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use calamine::{open_workbook, Reader, Xlsx};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::io_common::{resolve_path, simplify_file_name, slug};
use crate::survey::pipeline::*;
use crate::survey::plotter::*;

mod cleaner;
mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod pipeline;
mod plotter;
mod schema;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing json"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},

    #[snafu(display("Expected {expected} columns in the header, found {found}"))]
    SchemaMismatch { expected: usize, found: usize },
    #[snafu(display("Column {position}: expected header {expected:?}, found {found:?}"))]
    SchemaFieldMismatch {
        position: usize,
        expected: String,
        found: String,
    },
    #[snafu(display("Row {row}: expected {expected} cells, found {found}"))]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("The export has no answer label row"))]
    MissingLabelRow {},
    #[snafu(display("Row {row}: cannot read {value:?} as an integer in column {column}"))]
    CastFailure {
        row: usize,
        column: String,
        value: String,
    },

    #[snafu(display("Scoring error"))]
    Scoring { source: ScoringErrors },
    #[snafu(display("Error drawing chart {path}: {message}"))]
    Drawing { path: String, message: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// The cells of an export, as text. The header row is kept apart.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawSurveyTable {
    /// The file the table was read from.
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Settings from the command line that take precedence over the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOverrides {
    pub out: Option<String>,
    pub chart_dir: Option<String>,
}

fn read_survey_data(root: &Path, source: &SurveySource) -> SurveyResult<RawSurveyTable> {
    let p = resolve_path(root, &source.file_path);
    info!("Attempting to read survey file {:?}", p);
    match source.provider.as_deref().unwrap_or("csv") {
        "csv" => io_csv::read_csv_survey(&p),
        "xlsx" => io_excel::read_excel_survey(&p, source.excel_worksheet_name.as_deref()),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Read, clean, score and aggregate one survey source.
pub fn process_source(
    root: &Path,
    source: &SurveySource,
    rules: &ScoringRules,
) -> SurveyResult<DatasetReport> {
    let raw = read_survey_data(root, source)?;
    let table = cleaner::clean_survey(&raw)?;
    process_table(&source.label, &source.title(), &table, rules)
}

// The total, price and buy charts. The modes only apply to the grouped charts.
fn default_charts(percentage: Option<bool>, line: Option<bool>) -> Vec<ChartRequest> {
    ["total", "price", "buy"]
        .iter()
        .map(|g| chart_request(g, percentage, line))
        .collect()
}

fn chart_request(grouping: &str, percentage: Option<bool>, line: Option<bool>) -> ChartRequest {
    let grouped = grouping != "total";
    ChartRequest {
        grouping: grouping.to_string(),
        percentage: percentage.filter(|_| grouped),
        line: line.filter(|_| grouped),
    }
}

fn chart_file_name(label: &str, kind: ChartKind, mode: ChartMode) -> String {
    let mut name = format!("{}_{}", slug(label), kind.file_suffix());
    if mode.percentage {
        name.push_str("_pct");
    }
    if mode.line {
        name.push_str("_line");
    }
    name.push_str(".svg");
    name
}

// Chart files are named after the label: two labels with the same slug would overwrite
// each other's charts.
fn check_chart_names(sources: &[SurveySource]) -> SurveyResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for source in sources.iter() {
        let s = slug(&source.label);
        if let Some(previous) = seen.insert(s.clone(), source.label.as_str()) {
            whatever!(
                "labels {:?} and {:?} both name their charts {:?}",
                previous,
                source.label,
                s
            );
        }
    }
    Ok(())
}

/// Writes the charts requested for a source. Returns the paths of the written files.
fn render_charts(
    report: &DatasetReport,
    requests: &[ChartRequest],
    out_dir: &str,
    size: (u32, u32),
) -> SurveyResult<Vec<String>> {
    fs::create_dir_all(out_dir).context(WritingFileSnafu { path: out_dir })?;
    let mut written: Vec<String> = Vec::new();
    for request in requests.iter() {
        let kind = request.kind()?;
        let mode = request.mode();
        let path = resolve_path(
            Path::new(out_dir),
            &chart_file_name(&report.label, kind, mode),
        );
        match kind {
            ChartKind::Total => {
                if mode.percentage || mode.line {
                    warn!(
                        "render_charts: {}: the total chart has no percentage or line mode",
                        report.label
                    );
                }
                render_total_chart(&report.scores.total(), &report.title, &path, size)?
            }
            ChartKind::PriceBand => render_grouped_chart(
                &report.by_price,
                &category_labels(&report.by_price),
                kind,
                &report.title,
                mode,
                &path,
                size,
            )?,
            ChartKind::BuyingSentiment => render_grouped_chart(
                &report.by_buy,
                &category_labels(&report.by_buy),
                kind,
                &report.title,
                mode,
                &path,
                size,
            )?,
        }
        written.push(path);
    }
    Ok(written)
}

fn category_labels(list: &AggregatedScoreList) -> Vec<String> {
    list.categories
        .iter()
        .map(|c| c.category.label.clone())
        .collect()
}

fn tally_to_json(tally: &FeatureTally) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in tally.scores.iter() {
        m.insert(name.clone(), json!(count));
    }
    JSValue::Object(m)
}

fn grouped_to_json(list: &AggregatedScoreList) -> Vec<JSValue> {
    list.categories
        .iter()
        .map(|c| {
            json!({
                "code": c.category.code,
                "label": c.category.label,
                "respondents": c.respondents,
                "scores": tally_to_json(&c.tally)
            })
        })
        .collect()
}

fn report_to_json(report: &DatasetReport) -> JSValue {
    json!({
        "label": report.label,
        "respondents": report.cleaned,
        "scored": report.scores.rows.len(),
        "total": tally_to_json(&report.scores.total()),
        "price": grouped_to_json(&report.by_price),
        "priceUnassigned": report.by_price.unassigned,
        "buy": grouped_to_json(&report.by_buy),
        "buyUnassigned": report.by_buy.unassigned
    })
}

fn build_summary_js(config: &StudyConfig, reports: &[DatasetReport]) -> JSValue {
    let results: Vec<JSValue> = reports.iter().map(report_to_json).collect();
    json!({
        "config": { "study": config.output_settings.study_name },
        "results": results
    })
}

/// Runs a study described by an in-memory configuration.
///
/// root: the directory the relative paths of the configuration are resolved against.
pub fn run_study_config(
    config: &StudyConfig,
    root: &Path,
    check_summary_path: Option<&str>,
    overrides: &RunOverrides,
) -> SurveyResult<JSValue> {
    let rules = config.scoring_rules();
    ensure_whatever!(
        !config.survey_sources.is_empty(),
        "no survey sources detected"
    );

    let chart_dir: Option<String> = overrides.chart_dir.clone().or_else(|| {
        config
            .output_settings
            .output_directory
            .as_ref()
            .map(|d| resolve_path(root, d))
    });

    if chart_dir.is_some() {
        check_chart_names(&config.survey_sources)?;
    }

    let mut reports: Vec<DatasetReport> = Vec::new();
    for source in config.survey_sources.iter() {
        let report = process_source(root, source, &rules)?;
        if let Some(dir) = chart_dir.as_ref() {
            let requests = source
                .charts
                .clone()
                .unwrap_or_else(|| default_charts(None, None));
            let written = render_charts(
                &report,
                &requests,
                dir,
                config.output_settings.chart_size(),
            )?;
            info!("run_study: {}: wrote {:?}", source.label, written);
        } else {
            debug!("run_study: {}: no output directory, skipping charts", source.label);
        }
        reports.push(report);
    }

    // Assemble the final json
    let result_js = build_summary_js(config, &reports);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out = overrides.out.clone().or_else(|| {
        config
            .output_settings
            .summary_file
            .as_ref()
            .map(|f| resolve_path(root, f))
    });
    match out.as_deref() {
        Some("stdout") | None => println!("{}", pretty_js_stats),
        Some(path) => {
            info!("run_study: writing summary to {:?}", path);
            fs::write(path, &pretty_js_stats).context(WritingFileSnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        debug!("summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(result_js)
}

pub fn run_study(
    config_path: &str,
    check_summary_path: Option<&str>,
    overrides: &RunOverrides,
) -> SurveyResult<JSValue> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;
    run_study_config(&config, root_p, check_summary_path, overrides)
}

// A study of a single file, described on the command line.
fn config_from_args(input: &str, args: &Args) -> StudyConfig {
    let label = args
        .label
        .clone()
        .unwrap_or_else(|| simplify_file_name(input));
    let percentage = Some(args.percentage);
    let line = Some(args.line);
    let charts = match args.grouping.as_ref() {
        Some(groupings) => groupings
            .iter()
            .map(|g| chart_request(g, percentage, line))
            .collect(),
        None => default_charts(percentage, line),
    };
    StudyConfig {
        output_settings: OutputSettings {
            study_name: label.clone(),
            output_directory: None,
            summary_file: None,
            chart_width: None,
            chart_height: None,
        },
        survey_sources: vec![SurveySource {
            label,
            file_path: input.to_string(),
            provider: args.input_type.clone(),
            title: None,
            excel_worksheet_name: args.excel_worksheet_name.clone(),
            charts: Some(charts),
        }],
        winning_answer: None,
    }
}

pub fn run_cli(args: &Args) -> SurveyResult<()> {
    let overrides = RunOverrides {
        out: args.out.clone(),
        chart_dir: args.chart_dir.clone(),
    };
    let reference = args.reference.as_deref();
    match (args.config.as_ref(), args.input.as_ref()) {
        (Some(_), Some(_)) => whatever!("--config and --input cannot be used together"),
        (Some(config_path), None) => {
            run_study(config_path, reference, &overrides)?;
        }
        (None, Some(input)) => {
            let config = config_from_args(input, args);
            run_study_config(&config, Path::new(""), reference, &overrides)?;
        }
        (None, None) => whatever!("either --config or --input must be provided"),
    }
    Ok(())
}

#[cfg(test)]
fn run_study_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> SurveyResult<JSValue> {
    let default_dir = format!("{}/tests/data", env!("CARGO_MANIFEST_DIR"));
    let test_dir = option_env!("FEATPOLL_TEST_DIR").unwrap_or(default_dir.as_str());
    info!("Running test {}", test_name);
    let res = run_study(
        format!("{}/{}/{}", test_dir, test_name, config_lpath).as_str(),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath).as_str()),
        &RunOverrides::default(),
    );
    if let Err(e) = &res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = snafu::ErrorCompat::backtrace(e) {
            eprintln!("trace: {}", bt);
        }
    }
    res
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let res = run_study_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    assert!(res.is_ok(), "test {} failed", test_name);
}
