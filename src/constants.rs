// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the DNSPod webhook.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Webhook Contract Constants
// ============================================================================

/// Name this solver registers under; referenced as `solverName` on the Issuer
pub const SOLVER_NAME: &str = "dnspodchallenger";

/// API version of the cert-manager webhook contract
pub const WEBHOOK_API_VERSION: &str = "v1alpha1";

/// API version string carried in `ChallengePayload` documents
pub const CHALLENGE_PAYLOAD_API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";

/// Kind carried in `ChallengePayload` documents
pub const CHALLENGE_PAYLOAD_KIND: &str = "ChallengePayload";

/// Environment variable holding the webhook API group name
pub const GROUP_NAME_ENV: &str = "GROUP_NAME";

/// Default listen address for the webhook HTTP front
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

// ============================================================================
// Solver Configuration Defaults
// ============================================================================

/// Default TTL for challenge TXT records (10 minutes)
pub const DEFAULT_TTL_SECS: u32 = 600;

/// Default name of the Secret holding DNSPod credentials
pub const DEFAULT_SECRET_NAME: &str = "dnspod-credentials";

/// Default namespace of the Secret holding DNSPod credentials
pub const DEFAULT_SECRET_NAMESPACE: &str = "default";

/// Secret data key holding the DNSPod API token id
pub const SECRET_KEY_ID: &str = "id";

/// Secret data key holding the DNSPod API token value
pub const SECRET_KEY_TOKEN: &str = "token";

// ============================================================================
// DNSPod API Constants
// ============================================================================

/// Base URL of the DNSPod (China) API
pub const DNSPOD_API_ENDPOINT: &str = "https://dnsapi.cn";

/// DNSPod routing line applied to challenge records ("default" line)
pub const DNSPOD_DEFAULT_RECORD_LINE: &str = "默认";

/// Record type used for DNS-01 challenges
pub const TXT_RECORD_TYPE: &str = "TXT";

/// DNSPod status code for a successful call
pub const DNSPOD_STATUS_SUCCESS: &str = "1";

/// DNSPod status code returned by `Record.List` when nothing matches
pub const DNSPOD_STATUS_NO_RECORDS: &str = "10";

/// Message fragment DNSPod uses for empty record listings
pub const DNSPOD_NO_RECORDS_MESSAGE: &str = "No records";

/// User agent sent to DNSPod; anonymous clients are rejected
pub const DNSPOD_USER_AGENT: &str = concat!("dnspod-webhook/", env!("CARGO_PKG_VERSION"));

/// HTTP timeout for DNSPod API calls (30 seconds)
pub const DNSPOD_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries
pub const DNS_PORT: u16 = 53;

/// Per-query timeout for SOA lookups (5 seconds)
pub const DNS_QUERY_TIMEOUT_SECS: u64 = 5;

/// Resolver configuration consulted for recursive nameservers
pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Nameservers used when `/etc/resolv.conf` lists none
pub const FALLBACK_NAMESERVERS: [&str; 2] = ["8.8.8.8:53", "8.8.4.4:53"];
