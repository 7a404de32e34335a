use crate::survey::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "studyName")]
    pub study_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "summaryFile")]
    pub summary_file: Option<String>,
    #[serde(rename = "chartWidth")]
    pub chart_width: Option<u32>,
    #[serde(rename = "chartHeight")]
    pub chart_height: Option<u32>,
}

impl OutputSettings {
    pub fn chart_size(&self) -> (u32, u32) {
        (
            self.chart_width.unwrap_or(1200),
            self.chart_height.unwrap_or(800),
        )
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChartRequest {
    /// One of `total`, `price` or `buy`.
    pub grouping: String,
    pub percentage: Option<bool>,
    pub line: Option<bool>,
}

impl ChartRequest {
    pub fn kind(&self) -> SurveyResult<ChartKind> {
        match ChartKind::parse(self.grouping.as_str()) {
            Some(k) => Ok(k),
            None => whatever!("unknown chart grouping: {:?}", self.grouping),
        }
    }

    pub fn mode(&self) -> ChartMode {
        ChartMode {
            percentage: self.percentage.unwrap_or(false),
            line: self.line.unwrap_or(false),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveySource {
    pub label: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// `csv` (default) or `xlsx`.
    pub provider: Option<String>,
    /// Appended to the chart captions. Defaults to the label in brackets.
    pub title: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub charts: Option<Vec<ChartRequest>>,
}

impl SurveySource {
    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("({})", self.label))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "surveySources")]
    pub survey_sources: Vec<SurveySource>,
    /// The answer that credits the first option of a comparison.
    #[serde(rename = "winningAnswer")]
    pub winning_answer: Option<i64>,
}

impl StudyConfig {
    pub fn scoring_rules(&self) -> ScoringRules {
        let mut rules = ScoringRules::feature_poll();
        if let Some(answer) = self.winning_answer {
            rules.winning_answer = answer;
        }
        rules
    }
}

pub fn read_config(path: &str) -> SurveyResult<StudyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: StudyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
