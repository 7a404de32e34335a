use clap::Parser;

/// This is a feature poll tabulation program: it scores pairwise preference surveys and charts the scores.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the study: the survey files and the charts to draw.
    /// Either this option or --input must be provided.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of a study in JSON format. If provided, featpoll will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the study will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) A single survey export to tabulate, without a configuration file.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the file name of the input) The label of the survey, used in the summary and the chart names.
    #[clap(long, value_parser)]
    pub label: Option<String>,

    /// (total, price or buy, repeatable) The charts to draw for the input. All three by default.
    #[clap(long, value_parser)]
    pub grouping: Option<Vec<String>>,

    /// If passed, the grouped charts show each category as a share of its own total.
    #[clap(long, takes_value = false)]
    pub percentage: bool,

    /// If passed, the grouped charts draw one line per feature instead of grouped bars.
    #[clap(long, takes_value = false)]
    pub line: bool,

    /// (directory) Where the charts are written. Overrides the outputDirectory of the configuration.
    /// No chart is drawn when neither is set.
    #[clap(long, value_parser)]
    pub chart_dir: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use (the first one by default).
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
