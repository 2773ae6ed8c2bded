//! End-to-end tests against the public driver API.
//!
//! The format-checker and no-MX-records scenarios are deterministic and
//! need no real mail server. Full SMTP-conversation scenarios (valid,
//! not_existing, timeouts, connection errors) are covered as white-box
//! tests in `smtp.rs` against a local mock listener, since `verify_one`
//! always resolves MX records through a real DNS lookup and this crate's
//! format rule has no domain-literal escape hatch to redirect that lookup
//! at a loopback mock.

use validex::{VerdictCategory, VerifierConfig, verify_one};

#[tokio::test]
async fn invalid_format_short_circuits_before_any_network_io() {
    for address in ["not an address", "@", "local-part@", "@domain", "bad@@example.com"] {
        let verdict = verify_one(address, &VerifierConfig::default()).await;
        assert_eq!(verdict.category, VerdictCategory::InvalidFormat, "address: {address}");
        assert!(!verdict.is_valid);
    }
}

#[tokio::test]
async fn domain_with_no_mx_records_is_reported_as_such() {
    // `.invalid` is reserved by RFC 2606 specifically for this purpose:
    // guaranteed never to resolve.
    let verdict = verify_one("someone@does-not-exist.invalid", &VerifierConfig::default()).await;
    assert!(
        matches!(verdict.category, VerdictCategory::NoMxRecords | VerdictCategory::DnsError),
        "unexpected category: {:?}",
        verdict.category
    );
    assert!(!verdict.is_valid);
}
