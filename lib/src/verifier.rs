//! C4: composes C1 -> C2 -> C3-with-fallback into one classified [`Verdict`].

use tracing::debug;

use crate::dns::{self, MxLookup};
use crate::format;
use crate::smtp::{self, ProbeConfig, ProbeOutcome};
use crate::types::{Verdict, VerdictCategory};

/// Knobs for one address verification. `short_circuit_on_not_existing`
/// controls whether a `not_existing` response from one MX host stops the
/// fallback walk: the default of `false` keeps trying every MX in priority
/// order even after a `not_existing` response.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub probe: ProbeConfig,
    pub short_circuit_on_not_existing: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            probe: ProbeConfig::default(),
            short_circuit_on_not_existing: false,
        }
    }
}

/// Verify a single address end to end.
pub async fn verify(address: &str, config: &VerifierConfig) -> Verdict {
    if !format::is_well_formed(address) {
        return Verdict::new(address, VerdictCategory::InvalidFormat, "Invalid email address format");
    }

    // format::is_well_formed already guarantees exactly one '@' with
    // non-empty local part and domain.
    let (_, domain) = address.rsplit_once('@').expect("format check guarantees an '@'");

    let hosts = match dns::lookup_mx(domain).await {
        MxLookup::Found(hosts) => hosts,
        MxLookup::NoRecords => {
            return Verdict::new(address, VerdictCategory::NoMxRecords, "No MX records found for domain");
        }
        MxLookup::Error(message) => {
            return Verdict::new(address, VerdictCategory::DnsError, format!("DNS resolution error: {message}"))
                .with_mx_records(Vec::new());
        }
    };

    let mx_records = hosts.clone();
    let mut latest: Option<(String, VerdictCategory, String)> = None;

    for host in hosts {
        debug!(address, host = host.as_str(), "probing MX host");
        match smtp::probe(&host, address, &config.probe).await {
            ProbeOutcome::Valid => {
                return Verdict::new(address, VerdictCategory::Valid, "Address exists and can receive mail")
                    .with_mx_records(mx_records)
                    .with_smtp_server(host);
            }
            ProbeOutcome::NotExisting => {
                latest = Some((host.clone(), VerdictCategory::NotExisting, "Mailbox does not exist".to_string()));
                if config.short_circuit_on_not_existing {
                    break;
                }
            }
            ProbeOutcome::MailboxError => {
                latest = Some((host, VerdictCategory::MailboxError, "Mailbox error reported by server".to_string()));
            }
            ProbeOutcome::TemporaryError => {
                latest = Some((host, VerdictCategory::TemporaryError, "Temporary failure reported by server".to_string()));
            }
            ProbeOutcome::SmtpError(message) => {
                latest = Some((host, VerdictCategory::SmtpError, message));
            }
            ProbeOutcome::SmtpTimeout => {
                latest = Some((host, VerdictCategory::SmtpTimeout, "SMTP conversation timed out".to_string()));
            }
            ProbeOutcome::ConnectionError(message) => {
                latest = Some((host, VerdictCategory::ConnectionError, format!("Connection error: {message}")));
            }
        }
    }

    match latest {
        Some((host, category, message)) => {
            Verdict::new(address, category, message)
                .with_mx_records(mx_records)
                .with_smtp_server(host)
        }
        None => Verdict::new(address, VerdictCategory::SmtpTimeout, "All SMTP servers unreachable")
            .with_mx_records(mx_records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_format_short_circuits_before_dns() {
        let verdict = verify("not-an-address", &VerifierConfig::default()).await;
        assert_eq!(verdict.category, VerdictCategory::InvalidFormat);
        assert!(!verdict.is_valid);
    }

    #[tokio::test]
    async fn no_mx_records_for_domain_with_no_mail_exchanger() {
        let verdict = verify("user@example.invalid.no-mx-here.test", &VerifierConfig::default()).await;
        assert!(matches!(
            verdict.category,
            VerdictCategory::NoMxRecords | VerdictCategory::DnsError
        ));
    }
}
