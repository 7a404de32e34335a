mod config;
pub mod builder;
pub mod manual;

use log::{debug, info, warn};

use std::{
    collections::{HashMap, HashSet},
    ops::AddAssign,
};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct OptionId(usize);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct WinCount(u64);

impl WinCount {
    const EMPTY: WinCount = WinCount(0);
    const ONE: WinCount = WinCount(1);
}

impl std::iter::Sum for WinCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        WinCount(iter.map(|wc| wc.0).sum())
    }
}

impl AddAssign for WinCount {
    fn add_assign(&mut self, rhs: WinCount) {
        self.0 += rhs.0;
    }
}

// One comparison of the round robin, resolved to option ids.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct Edge {
    first: OptionId,
    second: OptionId,
}

// Invariant: every edge points to two distinct, existing options.
#[derive(Eq, PartialEq, Debug, Clone)]
struct CheckedRules {
    options: Vec<String>,
    edges: Vec<Edge>,
    winning_answer: i64,
}

impl CheckedRules {
    fn to_tally(&self, counts: &[WinCount]) -> FeatureTally {
        FeatureTally {
            scores: self
                .options
                .iter()
                .zip(counts.iter())
                .map(|(name, wc)| (name.clone(), wc.0))
                .collect(),
        }
    }
}

/// Scores every respondent with the given comparison rules.
///
/// Arguments:
/// * `coll` the responses to score, in table order
/// * `rules` the options and the comparison table
///
/// A respondent that skipped any comparison is not scored. The other rows keep their
/// index and their relative order.
pub fn run_feature_scores(
    coll: &[Response],
    rules: &ScoringRules,
) -> Result<FeatureScoreTable, ScoringErrors> {
    info!(
        "run_feature_scores: Processing {:?} responses, {:?} options, {:?} comparisons",
        coll.len(),
        rules.options.len(),
        rules.comparisons.len()
    );
    let checked = checks(rules)?;
    let table = score_checked(coll.iter(), &checked)?;
    info!(
        "run_feature_scores: scored {:?} respondents, skipped {:?}",
        table.rows.len(),
        table.skipped
    );
    Ok(table)
}

/// Scores every category of a grouping question independently and sums the scores
/// of each category.
///
/// The result always holds every category of the grouping, in the order of the grouping.
/// A category without any scored respondent gets a zero tally.
pub fn run_grouped_scores(
    coll: &[Response],
    grouping: &Grouping,
    rules: &ScoringRules,
) -> Result<AggregatedScoreList, ScoringErrors> {
    info!(
        "run_grouped_scores: Processing {:?} responses grouped by {:?}",
        coll.len(),
        grouping.column
    );
    let checked = checks(rules)?;
    check_grouping(grouping)?;

    let positions: HashMap<i64, usize> = grouping
        .categories
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.code, idx))
        .collect();

    let mut partitions: Vec<Vec<&Response>> = vec![Vec::new(); grouping.categories.len()];
    let mut leftover: Vec<&Response> = Vec::new();
    for r in coll.iter() {
        match r.group_code(&grouping.column).and_then(|c| positions.get(&c)) {
            Some(idx) => partitions[*idx].push(r),
            None => leftover.push(r),
        }
    }

    let mut categories: Vec<CategoryScores> = Vec::new();
    for (category, partition) in grouping.categories.iter().zip(partitions.into_iter()) {
        let table = score_checked(partition.into_iter(), &checked)?;
        let tally = table.total();
        debug!(
            "run_grouped_scores: {} {:?}: {:?} respondents, tally {:?}",
            grouping.column,
            category.code,
            table.rows.len(),
            tally
        );
        categories.push(CategoryScores {
            category: category.clone(),
            respondents: table.rows.len(),
            tally,
        });
    }

    // Only the respondents that would have been scored count as unassigned.
    let unassigned = score_checked(leftover.into_iter(), &checked)?.rows.len();
    if unassigned > 0 {
        warn!(
            "run_grouped_scores: {:?} scored respondents have no valid code for {:?}",
            unassigned, grouping.column
        );
    }

    Ok(AggregatedScoreList {
        column: grouping.column.clone(),
        categories,
        unassigned,
    })
}

fn score_checked<'a, I>(coll: I, rules: &CheckedRules) -> Result<FeatureScoreTable, ScoringErrors>
where
    I: Iterator<Item = &'a Response>,
{
    let mut rows: Vec<FeatureScoreRow> = Vec::new();
    let mut skipped: usize = 0;
    for r in coll {
        if r.answers.len() != rules.edges.len() {
            return Err(ScoringErrors::AnswerCountMismatch {
                index: r.index,
                expected: rules.edges.len(),
                found: r.answers.len(),
            });
        }
        match tally_answers(&r.answers, rules) {
            Some(counts) => rows.push(FeatureScoreRow {
                index: r.index,
                tally: rules.to_tally(&counts),
            }),
            None => {
                debug!("score_checked: respondent {:?} skipped a comparison", r.index);
                skipped += 1;
            }
        }
    }
    Ok(FeatureScoreTable {
        options: rules.options.clone(),
        rows,
        skipped,
    })
}

// Credits exactly one option per comparison. Returns None if any comparison was skipped.
fn tally_answers(answers: &[Option<i64>], rules: &CheckedRules) -> Option<Vec<WinCount>> {
    let mut counts = vec![WinCount::EMPTY; rules.options.len()];
    for (edge, answer) in rules.edges.iter().zip(answers.iter()) {
        let winner = if (*answer)? == rules.winning_answer {
            edge.first
        } else {
            edge.second
        };
        counts[winner.0] += WinCount::ONE;
    }
    debug_assert_eq!(
        counts.iter().cloned().sum::<WinCount>(),
        WinCount(rules.edges.len() as u64)
    );
    Some(counts)
}

pub(crate) fn checks(rules: &ScoringRules) -> Result<CheckedRules, ScoringErrors> {
    if rules.options.is_empty() {
        return Err(ScoringErrors::InvalidRules("no options".to_string()));
    }
    let mut ids: HashMap<&str, OptionId> = HashMap::new();
    for (idx, name) in rules.options.iter().enumerate() {
        if ids.insert(name.as_str(), OptionId(idx)).is_some() {
            return Err(ScoringErrors::InvalidRules(format!(
                "duplicate option {:?}",
                name
            )));
        }
    }

    let mut columns: HashSet<&str> = HashSet::new();
    let mut edges: Vec<Edge> = Vec::new();
    for c in rules.comparisons.iter() {
        if !columns.insert(c.column.as_str()) {
            return Err(ScoringErrors::InvalidRules(format!(
                "duplicate comparison column {:?}",
                c.column
            )));
        }
        let lookup = |name: &String| {
            ids.get(name.as_str()).cloned().ok_or_else(|| {
                ScoringErrors::InvalidRules(format!(
                    "comparison {:?} refers to unknown option {:?}",
                    c.column, name
                ))
            })
        };
        let first = lookup(&c.winner_if_one)?;
        let second = lookup(&c.winner_otherwise)?;
        if first == second {
            return Err(ScoringErrors::InvalidRules(format!(
                "comparison {:?} opposes {:?} to itself",
                c.column, c.winner_if_one
            )));
        }
        edges.push(Edge { first, second });
    }
    debug!("checks: edges {:?}", edges);

    Ok(CheckedRules {
        options: rules.options.clone(),
        edges,
        winning_answer: rules.winning_answer,
    })
}

fn check_grouping(grouping: &Grouping) -> Result<(), ScoringErrors> {
    if grouping.categories.is_empty() {
        return Err(ScoringErrors::InvalidGrouping(format!(
            "{:?} has no categories",
            grouping.column
        )));
    }
    let ascending = grouping
        .categories
        .windows(2)
        .all(|w| w[0].code < w[1].code);
    if !ascending {
        return Err(ScoringErrors::InvalidGrouping(format!(
            "categories of {:?} are not in strictly ascending order",
            grouping.column
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(index: usize, answers: [i64; 10], pay: Option<i64>) -> Response {
        Response {
            index,
            answers: answers.iter().map(|a| Some(*a)).collect(),
            groups: vec![(PAY_QUESTION.to_string(), pay)],
        }
    }

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scores(t: &FeatureTally) -> Vec<u64> {
        t.values()
    }

    #[test]
    fn first_named_option_always_wins() {
        let rules = ScoringRules::feature_poll();
        let table = run_feature_scores(&[response(1, [1; 10], None)], &rules).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(scores(&table.rows[0].tally), vec![4, 3, 2, 1, 0]);
        assert_eq!(table.rows[0].tally.get("AC"), Some(4));
        assert_eq!(table.rows[0].tally.get("JA"), Some(0));
    }

    #[test]
    fn second_named_option_always_wins() {
        let rules = ScoringRules::feature_poll();
        // Any answer other than 1 credits the second option.
        let answers = [0, 2, 0, 2, 0, 2, 0, 2, 0, 2];
        let table = run_feature_scores(&[response(1, answers, None)], &rules).unwrap();
        assert_eq!(scores(&table.rows[0].tally), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn every_answer_sheet_credits_ten_wins() {
        init();
        let rules = ScoringRules::feature_poll();
        let coll: Vec<Response> = (0..1024usize)
            .map(|bits| {
                let mut answers = [0i64; 10];
                for (k, a) in answers.iter_mut().enumerate() {
                    if bits & (1 << k) != 0 {
                        *a = 1;
                    }
                }
                response(bits, answers, None)
            })
            .collect();
        let table = run_feature_scores(&coll, &rules).unwrap();
        assert_eq!(table.rows.len(), 1024);
        for row in table.rows.iter() {
            assert_eq!(row.tally.total(), 10);
            assert!(row.tally.values().iter().all(|v| *v <= 4));
        }
    }

    #[test]
    fn each_comparison_credits_exactly_its_pair() {
        let rules = ScoringRules::feature_poll();
        let base = run_feature_scores(&[response(0, [0; 10], None)], &rules).unwrap();
        let base = scores(&base.rows[0].tally);
        for (k, (_, first, second)) in FEATURE_COMPARISONS.iter().enumerate() {
            let mut answers = [0i64; 10];
            answers[k] = 1;
            let flipped = run_feature_scores(&[response(0, answers, None)], &rules).unwrap();
            let flipped = scores(&flipped.rows[0].tally);
            for (idx, option) in FEATURE_OPTIONS.iter().enumerate() {
                let delta = flipped[idx] as i64 - base[idx] as i64;
                let expected = if option == first {
                    1
                } else if option == second {
                    -1
                } else {
                    0
                };
                assert_eq!(delta, expected, "comparison {} option {}", k, option);
            }
        }
    }

    #[test]
    fn skipped_comparison_drops_respondent() {
        let rules = ScoringRules::feature_poll();
        let mut partial = response(2, [1; 10], None);
        partial.answers[7] = None;
        let coll = vec![response(1, [1; 10], None), partial, response(3, [0; 10], None)];
        let table = run_feature_scores(&coll, &rules).unwrap();
        assert_eq!(table.skipped, 1);
        let indices: Vec<usize> = table.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(scores(&table.total()), vec![4, 4, 4, 4, 4]);
    }

    #[test]
    fn wrong_answer_count_is_an_error() {
        let rules = ScoringRules::feature_poll();
        let r = Response {
            index: 7,
            answers: vec![Some(1); 9],
            groups: vec![],
        };
        assert_eq!(
            run_feature_scores(&[r], &rules),
            Err(ScoringErrors::AnswerCountMismatch {
                index: 7,
                expected: 10,
                found: 9
            })
        );
    }

    #[test]
    fn invalid_rules() {
        let mut rules = ScoringRules::feature_poll();
        rules.comparisons[3].winner_otherwise = "XX".to_string();
        assert!(matches!(
            run_feature_scores(&[], &rules),
            Err(ScoringErrors::InvalidRules(_))
        ));

        let mut rules = ScoringRules::feature_poll();
        rules.comparisons[0].winner_otherwise = "AC".to_string();
        assert!(matches!(
            run_feature_scores(&[], &rules),
            Err(ScoringErrors::InvalidRules(_))
        ));

        let mut rules = ScoringRules::feature_poll();
        rules.options.push("AC".to_string());
        assert!(matches!(
            run_feature_scores(&[], &rules),
            Err(ScoringErrors::InvalidRules(_))
        ));
    }

    #[test]
    fn empty_category_gets_zero_tally() {
        let rules = ScoringRules::feature_poll();
        let coll = vec![
            response(1, [1; 10], Some(1)),
            response(2, [0; 10], Some(7)),
            response(3, [1; 10], Some(7)),
        ];
        let res = run_grouped_scores(&coll, &Grouping::price_bracket(), &rules).unwrap();
        assert_eq!(res.categories.len(), 7);
        let codes: Vec<i64> = res.categories.iter().map(|c| c.category.code).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(scores(&res.categories[0].tally), vec![4, 3, 2, 1, 0]);
        assert_eq!(scores(&res.categories[4].tally), vec![0, 0, 0, 0, 0]);
        assert_eq!(res.categories[4].respondents, 0);
        assert_eq!(scores(&res.categories[6].tally), vec![4, 4, 4, 4, 4]);
        assert_eq!(res.categories[6].respondents, 2);
        assert_eq!(res.unassigned, 0);
    }

    #[test]
    fn partitions_add_up_to_the_whole() {
        init();
        let rules = ScoringRules::feature_poll();
        let coll: Vec<Response> = (0..40usize)
            .map(|i| {
                let mut answers = [0i64; 10];
                for (k, a) in answers.iter_mut().enumerate() {
                    *a = ((i * 7 + k * 3) % 2) as i64;
                }
                response(i, answers, Some((i % 7) as i64 + 1))
            })
            .collect();
        let whole = run_feature_scores(&coll, &rules).unwrap().total();
        let grouped = run_grouped_scores(&coll, &Grouping::price_bracket(), &rules).unwrap();
        assert_eq!(grouped.unassigned, 0);
        assert_eq!(grouped.total(&rules.options), whole);
        assert_eq!(whole.total(), 400);
    }

    #[test]
    fn unassigned_respondents_are_counted() {
        init();
        let rules = ScoringRules::feature_poll();
        let mut incomplete = response(4, [1; 10], None);
        incomplete.answers[0] = None;
        let coll = vec![
            response(1, [1; 10], Some(2)),
            response(2, [1; 10], None),
            response(3, [1; 10], Some(9)),
            incomplete,
        ];
        let res = run_grouped_scores(&coll, &Grouping::buying_sentiment(), &rules).unwrap();
        // The buying sentiment code is not present at all.
        assert_eq!(res.unassigned, 3);
        let res = run_grouped_scores(&coll, &Grouping::price_bracket(), &rules).unwrap();
        assert_eq!(res.unassigned, 2);
        assert_eq!(res.categories[1].respondents, 1);
    }

    #[test]
    fn descending_grouping_is_rejected() {
        let rules = ScoringRules::feature_poll();
        let g = Grouping::new(BUY_QUESTION, &[(2, "b"), (1, "a")]);
        assert!(matches!(
            run_grouped_scores(&[], &g, &rules),
            Err(ScoringErrors::InvalidGrouping(_))
        ));
    }

    #[test]
    fn percentages() {
        let t = FeatureTally {
            scores: vec![
                ("AC".to_string(), 3),
                ("RR".to_string(), 1),
                ("CR".to_string(), 0),
                ("SGT".to_string(), 2),
                ("JA".to_string(), 4),
            ],
        };
        let p = t.percentages().unwrap();
        let sum: f64 = p.iter().map(|(_, v)| *v).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((p[0].1 - 30.0).abs() < 1e-9);
        let empty = FeatureTally::zero(&ScoringRules::feature_poll().options);
        assert_eq!(empty.percentages(), None);
    }
}
