//! C6: statistics aggregator.
//!
//! [`crate::types::Aggregate`] carries the fold logic (`record`/`merge`) as
//! methods since the scheduler needs to fold incrementally as verdicts
//! stream in; this module exposes the batch-oriented entry point for
//! folding an already-complete sequence of verdicts, e.g. from a caller
//! that only has `BatchOutcome::results` and wants to recompute stats.

use crate::types::{Aggregate, Verdict};

/// Fold a complete sequence of verdicts into one aggregate.
#[must_use]
pub fn aggregate(verdicts: &[Verdict]) -> Aggregate {
    let mut result = Aggregate::empty();
    for verdict in verdicts {
        result.record(verdict);
    }
    result
}
