//! C1: syntactic format screen.
//!
//! Deliberately stricter than RFC 5321 and treated as a wire contract: the
//! acceptance rule below must not be relaxed or tightened by reimplementers.

use std::sync::LazyLock;

use regex::Regex;

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^
        [A-Za-z0-9][A-Za-z0-9._%+\-]{0,63}
        @
        [A-Za-z0-9][A-Za-z0-9.\-]{0,253}
        \.[A-Za-z]{2,}
        $
        ",
    )
    .expect("format pattern is a fixed, valid regular expression")
});

/// Whether `address` matches the anchored format rule.
#[must_use]
pub fn is_well_formed(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
}
