//! Shared outcome types: verdicts, categories, and per-domain/aggregate statistics.

use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The closed set of deliverability outcomes a single address can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictCategory {
    Valid,
    InvalidFormat,
    NoMxRecords,
    DnsError,
    NotExisting,
    MailboxError,
    TemporaryError,
    SmtpError,
    SmtpTimeout,
    ConnectionError,
    ProcessingError,
}

impl VerdictCategory {
    /// All categories in the closed set, in the order the category
    /// histogram should list them before any unexpected extras.
    pub const ALL: [VerdictCategory; 11] = [
        VerdictCategory::Valid,
        VerdictCategory::InvalidFormat,
        VerdictCategory::NoMxRecords,
        VerdictCategory::DnsError,
        VerdictCategory::NotExisting,
        VerdictCategory::MailboxError,
        VerdictCategory::TemporaryError,
        VerdictCategory::SmtpError,
        VerdictCategory::SmtpTimeout,
        VerdictCategory::ConnectionError,
        VerdictCategory::ProcessingError,
    ];

    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, VerdictCategory::Valid)
    }
}

impl Display for VerdictCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VerdictCategory::Valid => "valid",
            VerdictCategory::InvalidFormat => "invalid_format",
            VerdictCategory::NoMxRecords => "no_mx_records",
            VerdictCategory::DnsError => "dns_error",
            VerdictCategory::NotExisting => "not_existing",
            VerdictCategory::MailboxError => "mailbox_error",
            VerdictCategory::TemporaryError => "temporary_error",
            VerdictCategory::SmtpError => "smtp_error",
            VerdictCategory::SmtpTimeout => "smtp_timeout",
            VerdictCategory::ConnectionError => "connection_error",
            VerdictCategory::ProcessingError => "processing_error",
        };
        write!(f, "{s}")
    }
}

/// Extra context a verdict may carry, depending on how far the pipeline got.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictDetails {
    /// MX hostnames, priority order, when the lookup succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mx_records: Option<Vec<String>>,
    /// The MX host that produced the decisive SMTP response, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_server: Option<String>,
}

/// The classified outcome for a single address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub address: String,
    pub is_valid: bool,
    pub category: VerdictCategory,
    pub message: String,
    pub details: VerdictDetails,
}

impl Verdict {
    #[must_use]
    pub fn new(address: impl Into<String>, category: VerdictCategory, message: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            is_valid: category.is_valid(),
            category,
            message: message.into(),
            details: VerdictDetails::default(),
        }
    }

    #[must_use]
    pub fn with_mx_records(mut self, mx_records: Vec<String>) -> Self {
        self.details.mx_records = Some(mx_records);
        self
    }

    #[must_use]
    pub fn with_smtp_server(mut self, smtp_server: impl Into<String>) -> Self {
        self.details.smtp_server = Some(smtp_server.into());
        self
    }
}

/// `(total, valid, invalid)` counts for one domain. Invariant: `valid + invalid == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainStat {
    pub total: u64,
    pub valid: u64,
    pub invalid: u64,
}

impl DomainStat {
    fn record(&mut self, is_valid: bool) {
        self.total += 1;
        if is_valid {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }

    fn merge(&self, other: &DomainStat) -> DomainStat {
        DomainStat {
            total: self.total + other.total,
            valid: self.valid + other.valid,
            invalid: self.invalid + other.invalid,
        }
    }
}

/// A domain-stat entry enriched with a formatted validity rate, as surfaced in `top_domains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDomain {
    pub domain: String,
    pub total: u64,
    pub valid: u64,
    pub invalid: u64,
    /// `(valid / total) * 100`, formatted to one decimal place.
    pub validity_rate: String,
}

/// Totals, category histogram, per-domain breakdown, and top-10 domains for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub total: u64,
    pub valid: u64,
    pub invalid: u64,
    pub categories: IndexMap<VerdictCategory, u64>,
    pub domains: IndexMap<String, DomainStat>,
    pub top_domains: Vec<TopDomain>,
}

impl Aggregate {
    #[must_use]
    pub fn empty() -> Self {
        let categories = VerdictCategory::ALL.into_iter().map(|c| (c, 0)).collect();
        Self {
            total: 0,
            valid: 0,
            invalid: 0,
            categories,
            domains: IndexMap::new(),
            top_domains: Vec::new(),
        }
    }

    /// Fold a single verdict into this aggregate, recomputing `top_domains`.
    pub fn record(&mut self, verdict: &Verdict) {
        self.total += 1;
        if verdict.is_valid {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }

        *self.categories.entry(verdict.category).or_insert(0) += 1;

        if let Some((_, domain)) = verdict.address.rsplit_once('@') {
            self.domains
                .entry(domain.to_string())
                .or_default()
                .record(verdict.is_valid);
        }

        self.recompute_top_domains();
    }

    fn recompute_top_domains(&mut self) {
        let mut entries: Vec<_> = self
            .domains
            .iter()
            .map(|(domain, stat)| (domain.clone(), *stat))
            .collect();
        // stable sort: ties keep insertion order, matching IndexMap iteration order
        entries.sort_by(|a, b| b.1.total.cmp(&a.1.total));
        entries.truncate(10);

        self.top_domains = entries
            .into_iter()
            .map(|(domain, stat)| TopDomain {
                domain,
                total: stat.total,
                valid: stat.valid,
                invalid: stat.invalid,
                validity_rate: format_validity_rate(stat),
            })
            .collect();
    }

    /// Combine two aggregates pointwise, as if their underlying verdict sets
    /// had been concatenated and aggregated together.
    #[must_use]
    pub fn merge(&self, other: &Aggregate) -> Aggregate {
        let mut categories = self.categories.clone();
        for (category, count) in &other.categories {
            *categories.entry(*category).or_insert(0) += count;
        }

        let mut domains = self.domains.clone();
        for (domain, stat) in &other.domains {
            let merged = domains
                .get(domain)
                .map_or(*stat, |existing| existing.merge(stat));
            domains.insert(domain.clone(), merged);
        }

        let mut merged = Aggregate {
            total: self.total + other.total,
            valid: self.valid + other.valid,
            invalid: self.invalid + other.invalid,
            categories,
            domains,
            top_domains: Vec::new(),
        };
        merged.recompute_top_domains();
        merged
    }
}

fn format_validity_rate(stat: DomainStat) -> String {
    if stat.total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", (stat.valid as f64 / stat.total as f64) * 100.0)
}

/// Full result of a batch run: per-address verdicts (input order) plus the final aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: Vec<Verdict>,
    pub statistics: Aggregate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_stat_invariant_holds_after_records() {
        let mut stat = DomainStat::default();
        stat.record(true);
        stat.record(false);
        stat.record(true);
        assert_eq!(stat.valid + stat.invalid, stat.total);
        assert_eq!(stat, DomainStat { total: 3, valid: 2, invalid: 1 });
    }

    #[test]
    fn aggregate_empty_has_every_category_zeroed() {
        let agg = Aggregate::empty();
        assert_eq!(agg.categories.len(), VerdictCategory::ALL.len());
        assert!(agg.categories.values().all(|&count| count == 0));
    }

    #[test]
    fn aggregate_record_updates_totals_and_domain_map() {
        let mut agg = Aggregate::empty();
        agg.record(&Verdict::new("a@ex.com", VerdictCategory::Valid, "ok"));
        agg.record(&Verdict::new("b@ex.com", VerdictCategory::NotExisting, "no"));

        assert_eq!(agg.total, 2);
        assert_eq!(agg.valid, 1);
        assert_eq!(agg.invalid, 1);
        assert_eq!(agg.categories[&VerdictCategory::Valid], 1);
        assert_eq!(agg.domains["ex.com"], DomainStat { total: 2, valid: 1, invalid: 1 });
        assert_eq!(agg.top_domains.len(), 1);
        assert_eq!(agg.top_domains[0].validity_rate, "50.0");
    }

    #[test]
    fn aggregate_skips_domain_for_address_without_at() {
        let mut agg = Aggregate::empty();
        agg.record(&Verdict::new("not-an-address", VerdictCategory::InvalidFormat, "bad"));
        assert!(agg.domains.is_empty());
        assert_eq!(agg.total, 1);
    }

    #[test]
    fn top_domains_sorted_descending_ties_broken_by_insertion_order() {
        let mut agg = Aggregate::empty();
        for addr in ["a@first.com", "b@second.com", "c@second.com", "d@first.com"] {
            agg.record(&Verdict::new(addr, VerdictCategory::Valid, "ok"));
        }
        // first.com and second.com both reach total=2; first.com was inserted first.
        assert_eq!(agg.top_domains[0].domain, "first.com");
        assert_eq!(agg.top_domains[1].domain, "second.com");
    }

    #[test]
    fn merge_is_pointwise_sum_of_disjoint_aggregates() {
        let mut left = Aggregate::empty();
        left.record(&Verdict::new("a@ex.com", VerdictCategory::Valid, "ok"));

        let mut right = Aggregate::empty();
        right.record(&Verdict::new("b@ex.com", VerdictCategory::NotExisting, "no"));
        right.record(&Verdict::new("c@other.com", VerdictCategory::Valid, "ok"));

        let merged = left.merge(&right);
        assert_eq!(merged.total, 3);
        assert_eq!(merged.valid, 2);
        assert_eq!(merged.invalid, 1);
        assert_eq!(merged.domains["ex.com"], DomainStat { total: 2, valid: 1, invalid: 1 });
        assert_eq!(merged.domains["other.com"], DomainStat { total: 1, valid: 1, invalid: 0 });
        assert_eq!(
            merged.categories[&VerdictCategory::Valid],
            left.categories[&VerdictCategory::Valid] + right.categories[&VerdictCategory::Valid]
        );
    }

    #[test]
    fn top_domains_capped_at_ten() {
        let mut agg = Aggregate::empty();
        for i in 0..15 {
            agg.record(&Verdict::new(format!("a@domain{i}.com"), VerdictCategory::Valid, "ok"));
        }
        assert_eq!(agg.top_domains.len(), 10);
    }
}
