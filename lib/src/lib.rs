//! validex - batched, rate-limited email deliverability validation.
//!
//! An address is screened for format (`format`), its domain's mail
//! exchangers are resolved (`dns`), and a live SMTP conversation is carried
//! out against each MX in priority order until one accepts the recipient or
//! every MX has been tried (`smtp`, composed by `verifier`). A batch of
//! addresses is driven through this pipeline by a concurrency-bounded,
//! rate-limited scheduler (`scheduler`), and the resulting verdicts are
//! folded into aggregate statistics (`stats`).
//!
//! Entry points: [`verify_one`] for a single address, [`verify_batch`] for
//! up to [`MAX_BATCH_SIZE`] addresses at once.

#![warn(clippy::all, clippy::pedantic)]

mod dns;
mod error;
mod format;
mod scheduler;
mod smtp;
mod stats;
mod types;
mod verifier;

pub use error::BatchError;
pub use scheduler::{MAX_BATCH_SIZE, SchedulerConfig};
pub use smtp::ProbeConfig;
pub use stats::aggregate;
pub use types::{
    Aggregate, BatchOutcome, DomainStat, TopDomain, Verdict, VerdictCategory, VerdictDetails,
};
pub use verifier::VerifierConfig;

/// Verify a single address: format check, MX lookup, SMTP probe with
/// MX-priority fallback.
pub async fn verify_one(address: &str, config: &VerifierConfig) -> Verdict {
    verifier::verify(address, config).await
}

/// Verify a batch of up to [`MAX_BATCH_SIZE`] addresses.
///
/// `on_progress(completed, total, &verdict)` fires once per address, in
/// input order. `on_stats_update` fires every 100 completions and once
/// more, unconditionally, at the end.
///
/// # Errors
///
/// Returns [`BatchError::TooManyAddresses`] if `addresses.len()` exceeds
/// `config.max_batch_size`, without scheduling any probes.
pub async fn verify_batch<P, S>(
    addresses: &[String],
    config: &SchedulerConfig,
    on_progress: P,
    on_stats_update: S,
) -> Result<BatchOutcome, BatchError>
where
    P: FnMut(usize, usize, &Verdict),
    S: FnMut(&Aggregate),
{
    scheduler::verify_batch(addresses, config, on_progress, on_stats_update).await
}
