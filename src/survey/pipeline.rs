// Clean table -> responses -> scores -> grouped scores.

use feature_poll::builder::Builder;

use crate::survey::{cleaner::*, schema::*, *};

/// Everything computed for one survey extract.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct DatasetReport {
    pub label: String,
    pub title: String,
    /// Respondents left after cleaning.
    pub cleaned: usize,
    pub scores: FeatureScoreTable,
    pub by_price: AggregatedScoreList,
    pub by_buy: AggregatedScoreList,
}

/// Loads the comparison answers and the grouping codes of every respondent.
pub fn build_responses(
    table: &CleanSurveyTable,
    rules: &ScoringRules,
    groupings: &[Grouping],
) -> SurveyResult<Builder> {
    let answer_positions: Vec<usize> = rules
        .comparison_columns()
        .iter()
        .map(|c| table.column_position(c))
        .collect::<SurveyResult<Vec<usize>>>()?;

    let mut group_positions: Vec<usize> = Vec::new();
    for g in groupings.iter() {
        let column = match grouping_column(&g.column) {
            Some(c) => c,
            None => whatever!("no survey column for grouping {:?}", g.column),
        };
        group_positions.push(table.column_position(column)?);
    }

    let mut builder = Builder::new(rules)
        .context(ScoringSnafu {})?
        .groupings(&groupings.iter().map(|g| g.column.clone()).collect::<Vec<_>>())
        .context(ScoringSnafu {})?;

    for (index, row) in table.index.iter().zip(table.rows.iter()) {
        let answers: Vec<Option<i64>> = answer_positions
            .iter()
            .map(|p| row[*p].as_integer())
            .collect();
        let codes: Vec<Option<i64>> = group_positions
            .iter()
            .map(|p| row[*p].as_integer())
            .collect();
        builder
            .add_response(*index, &answers, &codes)
            .context(ScoringSnafu {})?;
    }
    Ok(builder)
}

pub fn process_table(
    label: &str,
    title: &str,
    table: &CleanSurveyTable,
    rules: &ScoringRules,
) -> SurveyResult<DatasetReport> {
    let price = Grouping::price_bracket();
    let buy = Grouping::buying_sentiment();
    let builder = build_responses(table, rules, &[price.clone(), buy.clone()])?;

    let scores = builder.score().context(ScoringSnafu {})?;
    let by_price = builder.score_by(&price).context(ScoringSnafu {})?;
    let by_buy = builder.score_by(&buy).context(ScoringSnafu {})?;
    info!(
        "process_table: {}: {:?} respondents, {:?} scored, total {:?}",
        label,
        table.len(),
        scores.rows.len(),
        scores.total().scores
    );

    Ok(DatasetReport {
        label: label.to_string(),
        title: title.to_string(),
        cleaned: table.len(),
        scores,
        by_price,
        by_buy,
    })
}
