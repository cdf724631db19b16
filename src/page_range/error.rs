use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a single token of a page specification was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorReason {
    /// Not a number, not a range, too many `-`, or an inverted range.
    Malformed,
    /// Parsed fine, but names a page outside `1..=page_count`.
    OutOfRange { page_count: u32 },
}

/// One rejected token, carrying the text the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenError {
    pub token: String,
    pub reason: ErrorReason,
}

impl TokenError {
    pub fn malformed(token: &str) -> Self {
        TokenError {
            token: token.to_string(),
            reason: ErrorReason::Malformed,
        }
    }

    pub fn out_of_range(token: &str, page_count: u32) -> Self {
        TokenError {
            token: token.to_string(),
            reason: ErrorReason::OutOfRange { page_count },
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            ErrorReason::Malformed if self.token.contains('-') => {
                write!(f, "invalid range: {:?}", self.token)
            }
            ErrorReason::Malformed => write!(f, "invalid page number: {:?}", self.token),
            ErrorReason::OutOfRange { page_count } => write!(
                f,
                "page out of range: {:?} (document has {} page{})",
                self.token,
                page_count,
                if page_count == 1 { "" } else { "s" }
            ),
        }
    }
}

impl std::error::Error for TokenError {}

/// Reasons a selection cannot be turned into a plan.
///
/// Planning is all-or-nothing: any token error rejects the whole request so
/// that nothing is ever executed against a half-understood selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no pages specified")]
    EmptyInput,

    #[error("no valid pages in specification ({} invalid token(s))", .0.len())]
    AllInvalid(Vec<TokenError>),

    #[error("{} invalid token(s) in page specification", .0.len())]
    Invalid(Vec<TokenError>),
}

impl PlanError {
    /// The individual token errors, one per offending token, in input order.
    pub fn errors(&self) -> &[TokenError] {
        match self {
            PlanError::EmptyInput => &[],
            PlanError::AllInvalid(errors) | PlanError::Invalid(errors) => errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_token() {
        assert_eq!(
            TokenError::malformed("abc").to_string(),
            "invalid page number: \"abc\""
        );
        assert_eq!(
            TokenError::malformed("5-3").to_string(),
            "invalid range: \"5-3\""
        );
    }

    #[test]
    fn test_out_of_range_message() {
        assert_eq!(
            TokenError::out_of_range("12-15", 10).to_string(),
            "page out of range: \"12-15\" (document has 10 pages)"
        );
        assert_eq!(
            TokenError::out_of_range("2", 1).to_string(),
            "page out of range: \"2\" (document has 1 page)"
        );
    }

    #[test]
    fn test_plan_error_exposes_token_errors() {
        let errors = vec![TokenError::malformed("x"), TokenError::out_of_range("9", 5)];
        let err = PlanError::Invalid(errors.clone());
        assert_eq!(err.errors(), errors.as_slice());
        assert_eq!(err.to_string(), "2 invalid token(s) in page specification");
        assert!(PlanError::EmptyInput.errors().is_empty());
    }

    #[test]
    fn test_reason_serializes_tagged() {
        let json = serde_json::to_value(TokenError::out_of_range("9", 5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "token": "9",
                "reason": { "kind": "out_of_range", "page_count": 5 }
            })
        );
    }
}
