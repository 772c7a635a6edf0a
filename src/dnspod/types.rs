// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types for the DNSPod API.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::fmt;

/// DNSPod API credentials taken from the cluster Secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API token id
    pub id: String,
    /// API token value
    pub token: String,
}

impl Credentials {
    /// The `login_token` form parameter, `"{id},{token}"`.
    #[must_use]
    pub fn login_token(&self) -> String {
        format!("{},{}", self.id, self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// `status` block present on every DNSPod response.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A domain hosted in the DNSPod account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Domain {
    /// Domain id; numeric in `Domain.List`, normalized to a string
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Domain name without trailing dot
    pub name: String,
}

/// A record as returned by `Record.List`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default)]
    pub line: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub ttl: String,
}

/// Parameters for `Record.Create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    pub record_type: String,
    /// Name relative to the domain (`sub_domain`)
    pub name: String,
    pub value: String,
    /// Routing line, e.g. `默认`
    pub line: String,
    pub ttl: String,
}

/// Response envelope: the status block plus the call-specific body.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: Status,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DomainList {
    #[serde(default)]
    pub domains: Vec<Domain>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecordList {
    #[serde(default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreatedRecord {
    #[serde(default)]
    pub record: Option<CreatedRecordId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedRecordId {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Empty {}

/// DNSPod is inconsistent about quoting numbers; accept both.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
