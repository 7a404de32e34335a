// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The answers of one respondent, as handed over by the readers.
///
/// In most cases, it is enough to use the higher-level builder API.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Response {
    /// Position of the respondent in the source table. Kept through scoring so that
    /// scores can be joined back to the other answers of the respondent.
    pub index: usize,
    /// One answer per pairwise comparison, in the order of the comparison table.
    /// `None` is a skipped comparison.
    pub answers: Vec<Option<i64>>,
    /// Codes of the grouping questions (price bracket, buying sentiment, ...).
    pub groups: Vec<(String, Option<i64>)>,
}

impl Response {
    pub fn group_code(&self, column: &str) -> Option<i64> {
        self.groups
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, code)| *code)
    }
}

// ******** Output data structures *********

/// Number of pairwise wins per feature option, in option order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeatureTally {
    pub scores: Vec<(String, u64)>,
}

impl FeatureTally {
    pub fn zero(options: &[String]) -> FeatureTally {
        FeatureTally {
            scores: options.iter().map(|o| (o.clone(), 0)).collect(),
        }
    }

    pub fn total(&self) -> u64 {
        self.scores.iter().map(|(_, c)| *c).sum()
    }

    pub fn get(&self, option: &str) -> Option<u64> {
        self.scores
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, c)| *c)
    }

    pub fn values(&self) -> Vec<u64> {
        self.scores.iter().map(|(_, c)| *c).collect()
    }

    /// Each score as a percentage of the sum of the scores.
    ///
    /// The share of an empty tally is undefined and returns `None`.
    pub fn percentages(&self) -> Option<Vec<(String, f64)>> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(
            self.scores
                .iter()
                .map(|(name, c)| (name.clone(), (*c as f64 / total as f64) * 100.0))
                .collect(),
        )
    }

    /// Column-wise sum. Both tallies must list the same options in the same order.
    pub(crate) fn accumulate(&mut self, other: &FeatureTally) {
        for ((name, c), (other_name, other_c)) in self.scores.iter_mut().zip(other.scores.iter())
        {
            debug_assert_eq!(name, other_name);
            *c += *other_c;
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeatureScoreRow {
    pub index: usize,
    pub tally: FeatureTally,
}

/// The scores of every respondent that answered all the comparisons.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeatureScoreTable {
    pub options: Vec<String>,
    pub rows: Vec<FeatureScoreRow>,
    /// Respondents left out because at least one comparison was skipped.
    pub skipped: usize,
}

impl FeatureScoreTable {
    pub fn total(&self) -> FeatureTally {
        let mut res = FeatureTally::zero(&self.options);
        for row in self.rows.iter() {
            res.accumulate(&row.tally);
        }
        res
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CategoryScores {
    pub category: Category,
    /// Number of scored respondents in this category.
    pub respondents: usize,
    pub tally: FeatureTally,
}

/// Scores summed per category of a grouping question, in ascending category order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AggregatedScoreList {
    pub column: String,
    pub categories: Vec<CategoryScores>,
    /// Scored respondents whose code matched none of the categories.
    pub unassigned: usize,
}

impl AggregatedScoreList {
    pub fn total(&self, options: &[String]) -> FeatureTally {
        let mut res = FeatureTally::zero(options);
        for c in self.categories.iter() {
            res.accumulate(&c.tally);
        }
        res
    }
}

/// Errors that prevent the scoring from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    InvalidRules(String),
    InvalidGrouping(String),
    AnswerCountMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::InvalidRules(msg) => write!(f, "invalid scoring rules: {}", msg),
            ScoringErrors::InvalidGrouping(msg) => write!(f, "invalid grouping: {}", msg),
            ScoringErrors::AnswerCountMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "respondent {}: expected {} comparison answers, found {}",
                index, expected, found
            ),
        }
    }
}

// ********* Configuration **********

/// The five feature concepts of the feature poll, in reporting order.
pub const FEATURE_OPTIONS: [&str; 5] = ["AC", "RR", "CR", "SGT", "JA"];

/// The round robin of the feature poll: (column, credited if the answer is 1, credited otherwise).
pub const FEATURE_COMPARISONS: [(&str, &str, &str); 10] = [
    ("Q14", "AC", "RR"),
    ("Q15", "AC", "CR"),
    ("Q16", "AC", "SGT"),
    ("Q17", "AC", "JA"),
    ("Q18", "RR", "CR"),
    ("Q19", "RR", "SGT"),
    ("Q20", "RR", "JA"),
    ("Q21", "CR", "SGT"),
    ("Q22", "CR", "JA"),
    ("Q23", "SGT", "JA"),
];

/// The answer that credits the first-named option of a comparison.
pub const WINNING_ANSWER: i64 = 1;

pub const PAY_QUESTION: &str = "Pay Question";
pub const BUY_QUESTION: &str = "Buy Question";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseComparison {
    pub column: String,
    pub winner_if_one: String,
    pub winner_otherwise: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoringRules {
    pub options: Vec<String>,
    pub comparisons: Vec<PairwiseComparison>,
    pub winning_answer: i64,
}

impl ScoringRules {
    /// The five-option feature poll.
    pub fn feature_poll() -> ScoringRules {
        ScoringRules {
            options: FEATURE_OPTIONS.iter().map(|s| s.to_string()).collect(),
            comparisons: FEATURE_COMPARISONS
                .iter()
                .map(|(column, first, second)| PairwiseComparison {
                    column: column.to_string(),
                    winner_if_one: first.to_string(),
                    winner_otherwise: second.to_string(),
                })
                .collect(),
            winning_answer: WINNING_ANSWER,
        }
    }

    pub fn comparison_columns(&self) -> Vec<String> {
        self.comparisons.iter().map(|c| c.column.clone()).collect()
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules::feature_poll()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Category {
    pub code: i64,
    pub label: String,
}

/// A grouping question and its categories, in ascending code order.
///
/// Chart labels are positional: the order of the categories is the order of the ticks.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Grouping {
    pub column: String,
    pub categories: Vec<Category>,
}

impl Grouping {
    pub fn new(column: &str, categories: &[(i64, &str)]) -> Grouping {
        Grouping {
            column: column.to_string(),
            categories: categories
                .iter()
                .map(|(code, label)| Category {
                    code: *code,
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    /// Price bands, from "would not pay" to the most expensive band.
    pub fn price_bracket() -> Grouping {
        Grouping::new(
            PAY_QUESTION,
            &[
                (1, "Would not pay"),
                (2, "£0.01 - £0.99"),
                (3, "£1.00 - £2.99"),
                (4, "£3.00 - £4.99"),
                (5, "£5.00 - £6.99"),
                (6, "£7.00 - £9.99"),
                (7, "£10.00+"),
            ],
        )
    }

    pub fn buying_sentiment() -> Grouping {
        Grouping::new(
            BUY_QUESTION,
            &[
                (1, "Label 1"),
                (2, "Label 2"),
                (3, "Label 3"),
                (4, "Label 4"),
            ],
        )
    }

    pub fn labels(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.label.clone()).collect()
    }
}
