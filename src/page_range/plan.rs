use super::error::PlanError;
use super::resolve::{validate, ValidationOutcome};
use serde::Serialize;
use std::collections::BTreeSet;

/// How a validated selection is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Copy pages into a new document: input order, duplicates allowed.
    Extract,
    /// Delete pages in place: unique, highest index first.
    Remove,
    /// One output document per token, each a contiguous run.
    SplitBoundary,
    /// Modify pages in place (rotate, watermark): unique, ascending.
    Apply,
}

/// Ordered zero-based page indices ready to hand to a document operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PagePlan {
    Indices(Vec<usize>),
    Runs(Vec<Vec<usize>>),
}

impl PagePlan {
    /// Total number of page references in the plan.
    pub fn len(&self) -> usize {
        match self {
            PagePlan::Indices(indices) => indices.len(),
            PagePlan::Runs(runs) => runs.iter().map(Vec::len).sum(),
        }
    }

    pub fn into_indices(self) -> Vec<usize> {
        match self {
            PagePlan::Indices(indices) => indices,
            PagePlan::Runs(runs) => runs.into_iter().flatten().collect(),
        }
    }

    pub fn into_runs(self) -> Vec<Vec<usize>> {
        match self {
            PagePlan::Indices(indices) => vec![indices],
            PagePlan::Runs(runs) => runs,
        }
    }
}

/// Turn a validation outcome into a plan for `mode`.
///
/// Refuses to plan anything if any token failed validation.
pub fn plan(outcome: &ValidationOutcome, mode: SelectionMode) -> Result<PagePlan, PlanError> {
    if outcome.is_empty() {
        return Err(PlanError::EmptyInput);
    }
    if !outcome.errors.is_empty() {
        return Err(if outcome.groups.is_empty() {
            PlanError::AllInvalid(outcome.errors.clone())
        } else {
            PlanError::Invalid(outcome.errors.clone())
        });
    }

    let plan = match mode {
        SelectionMode::Extract => PagePlan::Indices(outcome.valid_indices()),
        SelectionMode::Remove => {
            let unique: BTreeSet<usize> = outcome.valid_indices().into_iter().collect();
            // Deleting from the back keeps the remaining indices stable.
            PagePlan::Indices(unique.into_iter().rev().collect())
        }
        SelectionMode::SplitBoundary => PagePlan::Runs(
            outcome
                .groups
                .iter()
                .map(|group| group.indices.clone())
                .collect(),
        ),
        SelectionMode::Apply => {
            let unique: BTreeSet<usize> = outcome.valid_indices().into_iter().collect();
            PagePlan::Indices(unique.into_iter().collect())
        }
    };

    Ok(plan)
}

/// One user action's selection: the text they typed, the page count of the
/// document it applies to, and what the pages are for.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub spec: &'a str,
    pub page_count: u32,
    pub mode: SelectionMode,
}

impl<'a> SelectionRequest<'a> {
    pub fn new(spec: &'a str, page_count: u32, mode: SelectionMode) -> Self {
        SelectionRequest {
            spec,
            page_count,
            mode,
        }
    }

    pub fn validate(&self) -> ValidationOutcome {
        validate(self.spec, self.page_count)
    }

    /// Run the whole pipeline: text, tokens, indices, ordered plan.
    pub fn plan(&self) -> Result<PagePlan, PlanError> {
        let outcome = self.validate();
        let result = plan(&outcome, self.mode);
        match &result {
            Ok(plan) => tracing::debug!(
                spec = self.spec,
                mode = ?self.mode,
                pages = plan.len(),
                "planned page selection"
            ),
            Err(err) => tracing::debug!(
                spec = self.spec,
                mode = ?self.mode,
                error = %err,
                "rejected page selection"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::error::TokenError;
    use crate::page_range::resolve::resolve;
    use crate::page_range::token::PageSpecToken;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn plan_str(spec: &str, n: u32, mode: SelectionMode) -> Result<PagePlan, PlanError> {
        SelectionRequest::new(spec, n, mode).plan()
    }

    #[test]
    fn test_remove_descending_unique() {
        let tokens = [
            PageSpecToken::single(3),
            PageSpecToken::single(1),
            PageSpecToken::single(3),
        ];
        let plan = plan(&resolve(&tokens, 5), SelectionMode::Remove).unwrap();
        assert_eq!(plan, PagePlan::Indices(vec![2, 0]));
    }

    #[test]
    fn test_extract_keeps_order_and_duplicates() {
        let tokens = [
            PageSpecToken::single(2),
            PageSpecToken::single(2),
            PageSpecToken::range(4, 5),
        ];
        let plan = plan(&resolve(&tokens, 5), SelectionMode::Extract).unwrap();
        assert_eq!(plan, PagePlan::Indices(vec![1, 1, 3, 4]));
    }

    #[test]
    fn test_removal_applied_in_plan_order() {
        let PagePlan::Indices(plan) = plan_str("3,1", 5, SelectionMode::Remove).unwrap() else {
            panic!("remove plans are flat");
        };
        assert_eq!(plan, vec![2, 0]);

        let mut pages: Vec<usize> = (0..5).collect();
        for index in plan {
            pages.remove(index);
        }
        assert_eq!(pages, vec![1, 3, 4]);
    }

    #[test]
    fn test_split_runs_not_merged() {
        let plan = plan_str("1-2,2-3,5", 5, SelectionMode::SplitBoundary).unwrap();
        assert_eq!(
            plan,
            PagePlan::Runs(vec![vec![0, 1], vec![1, 2], vec![4]])
        );
        assert_eq!(plan.len(), 5);
    }

    #[test]
    fn test_apply_ascending_unique() {
        let plan = plan_str("5,1-3,2", 5, SelectionMode::Apply).unwrap();
        assert_eq!(plan, PagePlan::Indices(vec![0, 1, 2, 4]));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(plan_str("  ", 5, SelectionMode::Extract), Err(PlanError::EmptyInput));
    }

    #[test]
    fn test_all_invalid() {
        let err = plan_str("x,9", 5, SelectionMode::Extract).unwrap_err();
        assert_eq!(
            err,
            PlanError::AllInvalid(vec![
                TokenError::malformed("x"),
                TokenError::out_of_range("9", 5),
            ])
        );
    }

    #[test]
    fn test_partial_errors_block_plan() {
        let err = plan_str("1,3,9", 5, SelectionMode::Remove).unwrap_err();
        assert_eq!(err, PlanError::Invalid(vec![TokenError::out_of_range("9", 5)]));
    }

    #[test]
    fn test_plan_flattening() {
        let runs = PagePlan::Runs(vec![vec![0, 1], vec![3]]);
        assert_eq!(runs.clone().into_indices(), vec![0, 1, 3]);
        assert_eq!(runs.into_runs().len(), 2);
        assert_eq!(PagePlan::Indices(vec![2]).into_runs(), vec![vec![2]]);
    }

    fn any_mode() -> impl Strategy<Value = SelectionMode> {
        prop_oneof![
            Just(SelectionMode::Extract),
            Just(SelectionMode::Remove),
            Just(SelectionMode::SplitBoundary),
            Just(SelectionMode::Apply),
        ]
    }

    proptest! {
        #[test]
        fn errors_never_yield_a_plan(
            valid in prop::collection::vec(1u32..=10, 0..5),
            bad in 11u32..100,
            mode in any_mode(),
        ) {
            let mut tokens: Vec<_> = valid.into_iter().map(PageSpecToken::single).collect();
            tokens.push(PageSpecToken::single(bad));
            prop_assert!(plan(&resolve(&tokens, 10), mode).is_err());
        }

        #[test]
        fn remove_plan_is_strictly_descending(pages in prop::collection::vec(1u32..=20, 1..15)) {
            let tokens: Vec<_> = pages.into_iter().map(PageSpecToken::single).collect();
            let indices = plan(&resolve(&tokens, 20), SelectionMode::Remove)
                .unwrap()
                .into_indices();
            prop_assert!(indices.windows(2).all(|w| w[0] > w[1]));
        }
    }
}
