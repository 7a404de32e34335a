pub use crate::config::*;

/// A builder for adding responses.
///
/// It checks every response against the comparison table as it is added, and keeps
/// the codes of the grouping questions next to the comparison answers.
///
/// ```
/// pub use feature_poll::builder::Builder;
/// pub use feature_poll::{Grouping, ScoringRules, PAY_QUESTION};
/// # use feature_poll::ScoringErrors;
///
/// let mut builder = Builder::new(&ScoringRules::feature_poll())?
///     .groupings(&[PAY_QUESTION.to_string()])?;
///
/// builder.add_response(1, &[Some(1); 10], &[Some(3)])?;
///
/// let by_price = builder.score_by(&Grouping::price_bracket())?;
/// assert_eq!(by_price.categories[2].tally.get("AC"), Some(4));
///
/// # Ok::<(), ScoringErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ScoringRules,
    pub(crate) _groupings: Vec<String>,
    pub(crate) _responses: Vec<Response>,
}

impl Builder {
    pub fn new(rules: &ScoringRules) -> Result<Builder, ScoringErrors> {
        crate::checks(rules)?;
        Ok(Builder {
            _rules: rules.clone(),
            _groupings: Vec::new(),
            _responses: Vec::new(),
        })
    }

    /// Declares the grouping questions. The codes passed to `add_response` follow this order.
    ///
    /// It must be called before any response is added.
    pub fn groupings(self, columns: &[String]) -> Result<Builder, ScoringErrors> {
        if !self._responses.is_empty() {
            return Err(ScoringErrors::InvalidGrouping(format!(
                "groupings declared after {} responses were added",
                self._responses.len()
            )));
        }
        Ok(Builder {
            _rules: self._rules,
            _groupings: columns.to_vec(),
            _responses: Vec::new(),
        })
    }

    /// Adds the answers of one respondent.
    ///
    /// answers: one entry per comparison, in the order of the comparison table.
    /// group_codes: one entry per declared grouping question.
    pub fn add_response(
        &mut self,
        index: usize,
        answers: &[Option<i64>],
        group_codes: &[Option<i64>],
    ) -> Result<(), ScoringErrors> {
        if group_codes.len() != self._groupings.len() {
            return Err(ScoringErrors::InvalidGrouping(format!(
                "respondent {}: expected {} group codes, found {}",
                index,
                self._groupings.len(),
                group_codes.len()
            )));
        }
        let groups = self
            ._groupings
            .iter()
            .cloned()
            .zip(group_codes.iter().cloned())
            .collect();
        self.add_response_2(&Response {
            index,
            answers: answers.to_vec(),
            groups,
        })
    }

    pub fn add_response_2(&mut self, response: &Response) -> Result<(), ScoringErrors> {
        let expected = self._rules.comparisons.len();
        if response.answers.len() != expected {
            return Err(ScoringErrors::AnswerCountMismatch {
                index: response.index,
                expected,
                found: response.answers.len(),
            });
        }
        self._responses.push(response.clone());
        Ok(())
    }

    pub fn responses(&self) -> &[Response] {
        &self._responses
    }

    pub fn rules(&self) -> &ScoringRules {
        &self._rules
    }

    pub fn score(&self) -> Result<FeatureScoreTable, ScoringErrors> {
        crate::run_feature_scores(&self._responses, &self._rules)
    }

    pub fn score_by(&self, grouping: &Grouping) -> Result<AggregatedScoreList, ScoringErrors> {
        crate::run_grouped_scores(&self._responses, grouping, &self._rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_answer_sheet() {
        let mut b = Builder::new(&ScoringRules::feature_poll()).unwrap();
        let res = b.add_response(3, &[Some(1); 4], &[]);
        assert!(matches!(
            res,
            Err(ScoringErrors::AnswerCountMismatch { index: 3, .. })
        ));
        assert!(b.responses().is_empty());
    }

    #[test]
    fn rejects_missing_group_code() {
        let mut b = Builder::new(&ScoringRules::feature_poll())
            .unwrap()
            .groupings(&[PAY_QUESTION.to_string(), BUY_QUESTION.to_string()])
            .unwrap();
        let res = b.add_response(3, &[Some(1); 10], &[Some(1)]);
        assert!(matches!(res, Err(ScoringErrors::InvalidGrouping(_))));
    }

    #[test]
    fn keeps_group_codes() {
        let mut b = Builder::new(&ScoringRules::feature_poll())
            .unwrap()
            .groupings(&[PAY_QUESTION.to_string(), BUY_QUESTION.to_string()])
            .unwrap();
        b.add_response(5, &[Some(0); 10], &[Some(6), None]).unwrap();
        let r = &b.responses()[0];
        assert_eq!(r.group_code(PAY_QUESTION), Some(6));
        assert_eq!(r.group_code(BUY_QUESTION), None);

        let by_buy = b.score_by(&Grouping::buying_sentiment()).unwrap();
        assert_eq!(by_buy.unassigned, 1);
        let by_pay = b.score_by(&Grouping::price_bracket()).unwrap();
        assert_eq!(by_pay.categories[5].tally.values(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn groupings_come_before_responses() {
        let mut b = Builder::new(&ScoringRules::feature_poll()).unwrap();
        b.add_response(1, &[Some(1); 10], &[]).unwrap();
        let res = b.groupings(&[PAY_QUESTION.to_string()]);
        assert!(matches!(res, Err(ScoringErrors::InvalidGrouping(_))));
    }

    #[test]
    fn invalid_rules_fail_early() {
        let mut rules = ScoringRules::feature_poll();
        rules.options.clear();
        assert!(Builder::new(&rules).is_err());
    }
}
