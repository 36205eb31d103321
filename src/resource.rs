// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Resource identifier classification.
//!
//! WebFinger resources arrive as free-form strings, most commonly in one of
//! these forms:
//! - `acct:user@example.com`
//! - `https://example.com/user`
//! - `mailto:user@example.com`
//!
//! Classification is a plain prefix/substring check. Identifiers are matched
//! as given: no case folding, percent-decoding or IDNA mapping is applied.

const ACCT_PREFIX: &str = "acct:";
const HTTPS_PREFIX: &str = "https://";
const MAILTO_PREFIX: &str = "mailto:";

/// Check whether `identifier` names an entity owned by `domain`.
///
/// `acct:` and `mailto:` identifiers must carry exactly `domain` after the
/// first `@`. For `https://` and any other scheme the domain only has to
/// occur somewhere in the identifier, so `https://evil.test/example.com`
/// matches `example.com`.
pub fn belongs_to_domain(identifier: &str, domain: &str) -> bool {
    if let Some(rest) = identifier.strip_prefix(ACCT_PREFIX) {
        return host_part_matches(rest, domain);
    }

    if let Some(rest) = identifier.strip_prefix(HTTPS_PREFIX) {
        return rest.contains(domain);
    }

    if let Some(rest) = identifier.strip_prefix(MAILTO_PREFIX) {
        return host_part_matches(rest, domain);
    }

    identifier.contains(domain)
}

/// Split `user@host` on the first `@` and compare the host verbatim.
fn host_part_matches(address: &str, domain: &str) -> bool {
    match address.split_once('@') {
        Some((_, host)) => host == domain,
        None => false,
    }
}
