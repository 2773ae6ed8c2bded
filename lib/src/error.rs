//! Error types for batch-boundary failures and the internal probe pipeline.
//!
//! Per-address failures never reach these types: every address resolution
//! produces a [`crate::Verdict`] instead (errors are values, see
//! `verifier`). These enums cover the handful of failures that surface
//! synchronously to the caller instead of through a verdict.

use thiserror::Error;

/// Failures that abort a batch before any address is scheduled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("batch of {actual} addresses exceeds the limit of {limit}")]
    TooManyAddresses { limit: usize, actual: usize },
}
