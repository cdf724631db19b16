//! Page selection: turns text like "1-3,5,7-9" into zero-based page indices.
//!
//! The pipeline is split in three stateless stages. [`token`] parses each
//! comma-separated piece, [`resolve`] checks the pieces against a page
//! count and collects every error, and [`plan`] orders the result for the
//! operation that will consume it.

pub mod error;
pub mod plan;
pub mod resolve;
pub mod token;

pub use error::{PlanError, TokenError};
pub use plan::{PagePlan, SelectionMode, SelectionRequest};
pub use resolve::ValidationOutcome;
