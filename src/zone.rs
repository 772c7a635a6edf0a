// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Authoritative zone discovery.
//!
//! DNSPod only knows the domains hosted in the account, while cert-manager may
//! hand over any name below them. The solver therefore asks recursive
//! nameservers which zone is authoritative for the requested name and matches
//! that against the DNSPod domain list.
//!
//! [`RecursiveZoneResolver`] walks the name from the most specific label
//! towards the root, querying `SOA` at each step. The first name that owns an
//! SOA record in the answer section is the zone apex.

use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{DNSClass, Name, RecordType};
use hickory_client::udp::UdpClientConnection;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{DNS_PORT, DNS_QUERY_TIMEOUT_SECS, FALLBACK_NAMESERVERS, RESOLV_CONF_PATH};
use crate::errors::{Result, SolverError};

/// Append the trailing dot if it is missing.
#[must_use]
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Strip one trailing dot, if present.
#[must_use]
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Candidate zone apexes for `fqdn`, most specific first, excluding the root.
///
/// `_acme-challenge.example.com.` yields `_acme-challenge.example.com.`,
/// `example.com.` and `com.`.
#[must_use]
pub fn zone_candidates(fqdn: &str) -> Vec<String> {
    let fqdn = to_fqdn(fqdn);
    let mut candidates = Vec::new();
    let mut rest = fqdn.as_str();

    while !rest.is_empty() && rest != "." {
        candidates.push(rest.to_string());
        match rest.find('.') {
            Some(idx) => rest = &rest[idx + 1..],
            None => break,
        }
    }

    candidates
}

/// Extract `nameserver` entries from resolv.conf contents.
#[must_use]
pub fn parse_resolv_conf(contents: &str) -> Vec<SocketAddr> {
    contents
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(addr)) => {
                    // Strip an IPv6 zone index (fe80::1%eth0)
                    let addr = addr.split('%').next().unwrap_or(addr);
                    IpAddr::from_str(addr)
                        .ok()
                        .map(|ip| SocketAddr::new(ip, DNS_PORT))
                }
                _ => None,
            }
        })
        .collect()
}

/// Finds the authoritative zone for a name.
#[async_trait]
pub trait ZoneResolver: Send + Sync {
    /// Return the zone apex (with trailing dot) that is authoritative for `fqdn`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::ZoneResolution`] if no zone can be determined.
    async fn find_authoritative_zone(&self, fqdn: &str) -> Result<String>;
}

/// [`ZoneResolver`] backed by recursive nameservers.
#[derive(Debug)]
pub struct RecursiveZoneResolver {
    nameservers: Vec<SocketAddr>,
    timeout: Duration,
    cache: Mutex<HashMap<String, String>>,
}

impl RecursiveZoneResolver {
    #[must_use]
    pub fn new(nameservers: Vec<SocketAddr>) -> Self {
        Self {
            nameservers,
            timeout: Duration::from_secs(DNS_QUERY_TIMEOUT_SECS),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Use the nameservers from `/etc/resolv.conf`, falling back to public
    /// resolvers when none are listed.
    #[must_use]
    pub fn from_system() -> Self {
        let mut nameservers = std::fs::read_to_string(RESOLV_CONF_PATH)
            .map(|contents| parse_resolv_conf(&contents))
            .unwrap_or_default();

        if nameservers.is_empty() {
            warn!(
                path = RESOLV_CONF_PATH,
                "No nameservers found, using fallback resolvers"
            );
            nameservers = FALLBACK_NAMESERVERS
                .iter()
                .filter_map(|addr| addr.parse().ok())
                .collect();
        }

        Self::new(nameservers)
    }

    #[must_use]
    pub fn nameservers(&self) -> &[SocketAddr] {
        &self.nameservers
    }
}

#[async_trait]
impl ZoneResolver for RecursiveZoneResolver {
    async fn find_authoritative_zone(&self, fqdn: &str) -> Result<String> {
        let fqdn = to_fqdn(fqdn);

        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&fqdn)
            .cloned();
        if let Some(zone) = cached {
            return Ok(zone);
        }

        let nameservers = self.nameservers.clone();
        let timeout = self.timeout;
        let lookup_fqdn = fqdn.clone();

        let zone = tokio::task::spawn_blocking(move || lookup_zone(&lookup_fqdn, &nameservers, timeout))
            .await
            .map_err(|e| SolverError::ZoneResolution {
                fqdn: fqdn.clone(),
                reason: format!("DNS lookup task failed: {e}"),
            })?
            .map_err(|reason| SolverError::ZoneResolution {
                fqdn: fqdn.clone(),
                reason,
            })?;

        debug!(fqdn = %fqdn, zone = %zone, "Found authoritative zone");
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fqdn, zone.clone());

        Ok(zone)
    }
}

/// Outcome of one SOA query.
struct SoaAnswer {
    code: ResponseCode,
    owns_soa: bool,
}

fn lookup_zone(
    fqdn: &str,
    nameservers: &[SocketAddr],
    timeout: Duration,
) -> std::result::Result<String, String> {
    for candidate in zone_candidates(fqdn) {
        let name =
            Name::from_str(&candidate).map_err(|e| format!("invalid name {candidate}: {e}"))?;

        let answer = query_soa(&name, nameservers, timeout)?;
        match answer.code {
            ResponseCode::NoError | ResponseCode::NXDomain => {}
            code => {
                return Err(format!(
                    "unexpected response code {code:?} for {candidate}"
                ))
            }
        }

        if answer.owns_soa {
            return Ok(candidate);
        }
    }

    Err("no SOA record found".to_string())
}

/// Query `name` for SOA, trying each nameserver until one answers.
fn query_soa(
    name: &Name,
    nameservers: &[SocketAddr],
    timeout: Duration,
) -> std::result::Result<SoaAnswer, String> {
    let mut last_error = "no nameservers configured".to_string();

    for server in nameservers {
        let conn = match UdpClientConnection::with_timeout(*server, timeout) {
            Ok(conn) => conn,
            Err(e) => {
                last_error = format!("failed to connect to {server}: {e}");
                continue;
            }
        };
        let client = SyncClient::new(conn);

        match client.query(name, DNSClass::IN, RecordType::SOA) {
            Ok(response) => {
                let owns_soa = response
                    .answers()
                    .iter()
                    .any(|r| r.record_type() == RecordType::SOA && r.name() == name);
                return Ok(SoaAnswer {
                    code: response.response_code(),
                    owns_soa,
                });
            }
            Err(e) => {
                warn!(server = %server, name = %name, error = %e, "SOA query failed");
                last_error = format!("SOA query for {name} at {server} failed: {e}");
            }
        }
    }

    Err(last_error)
}

/// [`ZoneResolver`] that answers from a fixed table.
///
/// Names without an entry resolve to themselves, which treats the zone handed
/// over by cert-manager as authoritative.
#[derive(Debug, Clone, Default)]
pub struct StaticZoneResolver {
    zones: HashMap<String, String>,
}

impl StaticZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `fqdn` to `zone`.
    #[must_use]
    pub fn with_zone(mut self, fqdn: &str, zone: &str) -> Self {
        self.zones.insert(to_fqdn(fqdn), to_fqdn(zone));
        self
    }
}

#[async_trait]
impl ZoneResolver for StaticZoneResolver {
    async fn find_authoritative_zone(&self, fqdn: &str) -> Result<String> {
        let fqdn = to_fqdn(fqdn);
        Ok(self.zones.get(&fqdn).cloned().unwrap_or(fqdn))
    }
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
