// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Challenge TXT record construction.
//!
//! DNSPod addresses records by their name relative to the hosted domain, so the
//! FQDN handed over by cert-manager is reduced to that relative name before any
//! API call. `present` and `cleanup` both go through [`extract_record_name`],
//! which keeps created and looked-up names in agreement.

use crate::constants::{DNSPOD_DEFAULT_RECORD_LINE, TXT_RECORD_TYPE};
use crate::dnspod::{Record, RecordRequest};
use crate::zone::un_fqdn;

/// Compute the record name relative to `zone`.
///
/// Returns the part of `fqdn` before the first occurrence of `"." + zone`, or
/// `fqdn` without its trailing dot when the zone does not occur in it.
///
/// # Example
///
/// ```rust
/// use dnspod_webhook::records::extract_record_name;
///
/// assert_eq!(
///     extract_record_name("_acme-challenge.example.com.", "example.com."),
///     "_acme-challenge"
/// );
/// assert_eq!(extract_record_name("www.other.org.", "example.com."), "www.other.org");
/// ```
#[must_use]
pub fn extract_record_name(fqdn: &str, zone: &str) -> String {
    match fqdn.find(&format!(".{zone}")) {
        Some(idx) => fqdn[..idx].to_string(),
        None => un_fqdn(fqdn).to_string(),
    }
}

/// Build the DNSPod create request for a challenge TXT record.
#[must_use]
pub fn new_txt_record(zone: &str, fqdn: &str, value: &str, ttl: u32) -> RecordRequest {
    RecordRequest {
        record_type: TXT_RECORD_TYPE.to_string(),
        name: extract_record_name(fqdn, zone),
        value: value.to_string(),
        line: DNSPOD_DEFAULT_RECORD_LINE.to_string(),
        ttl: ttl.to_string(),
    }
}

/// Keep only the records whose value is exactly the challenge key.
///
/// Other TXT records sharing the name belong to concurrent validations and
/// must be left alone.
pub fn records_with_value<'a>(
    records: &'a [Record],
    key: &'a str,
) -> impl Iterator<Item = &'a Record> + 'a {
    records.iter().filter(move |record| record.value == key)
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
