//! Compliance evaluation engine
//!
//! This module provides:
//! - **reader**: canonical reads that degrade every failure to "absent"
//! - **writer**: type-aware coercion and writes/deletes
//! - **compare**: equality of canonical values against declarations
//! - **evaluator**: the per-setting detect/remediate/verify state machine

pub mod compare;
mod evaluator;
pub mod reader;
mod result;
pub mod writer;

pub use evaluator::Evaluator;
pub use reader::ReadOutcome;
pub use result::{EvaluationResult, Failure, FailureKind, RemediationOutcome, StatusToken};
