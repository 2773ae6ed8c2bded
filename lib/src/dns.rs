//! C2: DNS MX lookup, priority-sorted.

use hickory_resolver::Resolver;
use hickory_resolver::proto::rr::rdata::MX;
use tracing::trace;

/// Outcome of an MX lookup, folding "no records" and "lookup failed"
/// into the two categories C4 needs to distinguish.
#[derive(Debug)]
pub enum MxLookup {
    /// Priority-sorted (ascending) list of usable exchanger hostnames.
    Found(Vec<String>),
    /// No records, NXDOMAIN, or an empty answer.
    NoRecords,
    /// A transport or other resolver failure, distinct from a clean "no records".
    Error(String),
}

/// Resolve the MX records for `domain`, sorted by preference ascending.
///
/// Stateless: builds a fresh resolver per call, no cross-address caching.
pub async fn lookup_mx(domain: &str) -> MxLookup {
    let resolver = match Resolver::builder_tokio() {
        Ok(builder) => builder.build(),
        Err(e) => return MxLookup::Error(e.to_string()),
    };

    let answer = match resolver.mx_lookup(domain).await {
        Ok(answer) => answer,
        Err(e) if e.is_no_records_found() => return MxLookup::NoRecords,
        Err(e) => return MxLookup::Error(e.to_string()),
    };

    let mut records: Vec<MX> = answer
        .into_iter()
        // Only resolvable, fully-qualified domain names are valid SMTP targets.
        .filter(|r| r.exchange().is_fqdn())
        .filter(|r| !r.exchange().is_root())
        .collect();
    records.sort_by_key(MX::preference);

    trace!(domain, count = records.len(), "resolved MX records");

    if records.is_empty() {
        return MxLookup::NoRecords;
    }

    MxLookup::Found(
        records
            .into_iter()
            .map(|r| r.exchange().to_string())
            .collect(),
    )
}
