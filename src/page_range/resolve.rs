use super::error::TokenError;
use super::token::{parse_spec, PageSpecToken};
use serde::Serialize;

/// The zero-based pages one token contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedToken {
    pub token: String,
    pub indices: Vec<usize>,
}

/// Result of checking a page specification against a document's page count.
///
/// Every index held here satisfies `index < page_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub groups: Vec<ResolvedToken>,
    pub errors: Vec<TokenError>,
}

impl ValidationOutcome {
    /// All valid indices in left-to-right expansion order, duplicates kept.
    pub fn valid_indices(&self) -> Vec<usize> {
        self.groups
            .iter()
            .flat_map(|group| group.indices.iter().copied())
            .collect()
    }

    /// True when the specification contained no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.errors.is_empty()
    }

    fn push_token(&mut self, token: &PageSpecToken, page_count: u32) {
        let (first, last) = (token.first(), token.last());

        // Only the in-range part is expanded, so "1-4000000000" stays cheap.
        let lo = first.max(1);
        let hi = last.min(page_count);
        if lo <= hi {
            self.groups.push(ResolvedToken {
                token: token.raw.clone(),
                indices: (lo..=hi).map(|page| (page - 1) as usize).collect(),
            });
        }

        // One error per token, however many of its pages are missing.
        if first == 0 || last > page_count {
            self.errors
                .push(TokenError::out_of_range(&token.raw, page_count));
        }
    }
}

/// Resolve parsed tokens into zero-based indices against `page_count`.
///
/// Errors are collected for every token rather than stopping at the first.
pub fn resolve(tokens: &[PageSpecToken], page_count: u32) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    for token in tokens {
        outcome.push_token(token, page_count);
    }
    outcome
}

/// Parse and resolve a raw specification in one pass.
///
/// Malformed and out-of-range errors are reported in the order their tokens
/// appear in `input`.
pub fn validate(input: &str, page_count: u32) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    for parsed in parse_spec(input) {
        match parsed {
            Ok(token) => outcome.push_token(&token, page_count),
            Err(err) => outcome.errors.push(err),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::error::ErrorReason;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_concrete_mixed_spec() {
        let outcome = validate("1-3,5,7-9", 10);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.valid_indices(), vec![0, 1, 2, 4, 6, 7, 8]);
    }

    #[test]
    fn test_collects_past_first_error() {
        let outcome = validate("1,3,9", 5);
        assert_eq!(outcome.valid_indices(), vec![0, 2]);
        assert_eq!(outcome.errors, vec![TokenError::out_of_range("9", 5)]);
    }

    #[test]
    fn test_errors_in_input_order() {
        let outcome = validate("7,abc,2,5-3,0", 5);
        let tokens: Vec<_> = outcome.errors.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, vec!["7", "abc", "5-3", "0"]);
        assert_eq!(outcome.errors[1].reason, ErrorReason::Malformed);
        assert_eq!(
            outcome.errors[3].reason,
            ErrorReason::OutOfRange { page_count: 5 }
        );
        assert_eq!(outcome.valid_indices(), vec![1]);
    }

    #[test]
    fn test_partial_range_reports_once() {
        let outcome = validate("8-15", 10);
        assert_eq!(outcome.valid_indices(), vec![7, 8, 9]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].token, "8-15");
    }

    #[test]
    fn test_huge_range_does_not_expand() {
        let outcome = validate("1-4000000000", 3);
        assert_eq!(outcome.valid_indices(), vec![0, 1, 2]);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_duplicates_preserved() {
        let tokens = [
            PageSpecToken::single(2),
            PageSpecToken::single(2),
            PageSpecToken::range(4, 5),
        ];
        assert_eq!(resolve(&tokens, 5).valid_indices(), vec![1, 1, 3, 4]);
    }

    #[test]
    fn test_empty_token_list() {
        let outcome = resolve(&[], 5);
        assert!(outcome.is_empty());
        assert!(outcome.valid_indices().is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_groups_track_tokens() {
        let outcome = validate("2-3, 1", 4);
        assert_eq!(
            outcome.groups,
            vec![
                ResolvedToken {
                    token: "2-3".into(),
                    indices: vec![1, 2],
                },
                ResolvedToken {
                    token: "1".into(),
                    indices: vec![0],
                },
            ]
        );
    }

    proptest! {
        #[test]
        fn single_in_range_resolves(n in 1u32..500, offset in 0u32..500) {
            let p = offset % n + 1;
            let outcome = resolve(&[PageSpecToken::single(p)], n);
            prop_assert_eq!(outcome.valid_indices(), vec![(p - 1) as usize]);
            prop_assert!(outcome.errors.is_empty());
        }

        #[test]
        fn range_in_range_is_ascending(n in 1u32..300, a in 0u32..300, b in 0u32..300) {
            let (start, end) = {
                let (x, y) = (a % n + 1, b % n + 1);
                (x.min(y), x.max(y))
            };
            let outcome = resolve(&[PageSpecToken::range(start, end)], n);
            let indices = outcome.valid_indices();
            prop_assert!(outcome.errors.is_empty());
            prop_assert_eq!(indices.len() as u32, end - start + 1);
            prop_assert!(indices.windows(2).all(|w| w[1] == w[0] + 1));
            prop_assert_eq!(indices[0], (start - 1) as usize);
        }

        #[test]
        fn just_past_the_end_is_out_of_range(n in 1u32..1000) {
            let outcome = resolve(&[PageSpecToken::single(n + 1)], n);
            prop_assert!(outcome.valid_indices().is_empty());
            prop_assert_eq!(outcome.errors.len(), 1);
            prop_assert_eq!(outcome.errors[0].reason, ErrorReason::OutOfRange { page_count: n });
        }

        #[test]
        fn indices_always_below_page_count(spec in "[0-9, -]{0,24}", n in 0u32..50) {
            let outcome = validate(&spec, n);
            prop_assert!(outcome.valid_indices().iter().all(|&i| i < n as usize));
        }
    }
}
