// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-challenge solver configuration.
//!
//! cert-manager hands the `config` block of the Issuer's webhook solver to the
//! webhook as opaque JSON. This module decodes it into [`SolverConfig`],
//! applying defaults for every key that is not set:
//!
//! ```yaml
//! solvers:
//!   - dns01:
//!       webhook:
//!         groupName: acme.example.com
//!         solverName: dnspodchallenger
//!         config:
//!           apiTokenSecret:
//!             name: dnspod-credentials
//!             namespace: cert-manager
//!           ttl: 600
//! ```
//!
//! # Example
//!
//! ```rust
//! use dnspod_webhook::config::load_config;
//!
//! let cfg = load_config(None).unwrap();
//! assert_eq!(cfg.ttl, 600);
//! assert_eq!(cfg.api_token_secret.to_string(), "default/dnspod-credentials");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFAULT_SECRET_NAME, DEFAULT_SECRET_NAMESPACE, DEFAULT_TTL_SECS};
use crate::errors::{Result, SolverError};

/// Reference to the Secret holding DNSPod API credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretRef {
    /// Secret name
    pub name: String,
    /// Secret namespace
    pub namespace: String,
}

impl Default for SecretRef {
    fn default() -> Self {
        Self {
            name: DEFAULT_SECRET_NAME.to_string(),
            namespace: DEFAULT_SECRET_NAMESPACE.to_string(),
        }
    }
}

/// Renders as `namespace/name`, the credential cache key.
impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Decoded solver configuration for one challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverConfig {
    /// Secret holding the DNSPod `id` and `token`
    pub api_token_secret: SecretRef,
    /// TTL of the challenge TXT record in seconds
    pub ttl: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            api_token_secret: SecretRef::default(),
            ttl: DEFAULT_TTL_SECS,
        }
    }
}

/// Decode the opaque solver configuration, overlaying it on the defaults.
///
/// An absent (or `null`) configuration yields [`SolverConfig::default`].
/// Keys that are present replace the matching default; keys that are absent
/// keep it, including the nested `apiTokenSecret` fields.
///
/// # Errors
///
/// Returns [`SolverError::ConfigDecode`] when the configuration is not an
/// object or a recognized key has the wrong type.
pub fn load_config(config: Option<&serde_json::Value>) -> Result<SolverConfig> {
    match config {
        None | Some(serde_json::Value::Null) => Ok(SolverConfig::default()),
        Some(raw) => SolverConfig::deserialize(raw).map_err(SolverError::ConfigDecode),
    }
}
