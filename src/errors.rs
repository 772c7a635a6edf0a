// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the DNSPod challenge solver.
//!
//! Every failure in `present` and `cleanup` is reported to cert-manager through
//! [`SolverError`]. Nothing is retried locally: cert-manager re-invokes the
//! webhook on its own polling cadence.

use crate::dnspod::DnspodError;
use thiserror::Error;

/// Errors that can occur while solving a DNS-01 challenge.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The per-challenge solver configuration could not be decoded
    ///
    /// Returned when the `config` block on the Issuer is not an object or one
    /// of its recognized keys has the wrong type.
    #[error("error decoding solver config: {0}")]
    ConfigDecode(#[source] serde_json::Error),

    /// A required field is absent from the credentials Secret
    #[error("no `{field}` in secret '{secret}'")]
    MissingCredential {
        /// Secret data key that was expected (`id` or `token`)
        field: &'static str,
        /// Secret reference in `namespace/name` form
        secret: String,
    },

    /// A credentials field is present but not valid UTF-8
    #[error("`{field}` in secret '{secret}' is not valid UTF-8")]
    InvalidCredential {
        /// Secret data key that failed to decode
        field: &'static str,
        /// Secret reference in `namespace/name` form
        secret: String,
    },

    /// Fetching the credentials Secret from the cluster failed
    #[error("failed to get secret '{secret}': {reason}")]
    SecretFetch {
        /// Secret reference in `namespace/name` form
        secret: String,
        /// Error reported by the secret store
        reason: String,
    },

    /// A DNSPod API call failed
    ///
    /// `context` names the failing call so the message surfaced on the
    /// Challenge resource identifies it.
    #[error("{context}: {source}")]
    Api {
        /// Description of the failing call
        context: String,
        /// Underlying DNSPod error
        #[source]
        source: DnspodError,
    },

    /// The authoritative zone is not hosted in the DNSPod account
    #[error("Zone {auth_zone} not found in dnspod for zone {zone}")]
    ZoneNotFound {
        /// Authoritative zone found via DNS
        auth_zone: String,
        /// Zone requested by cert-manager
        zone: String,
    },

    /// DNSPod returned a domain id that is not an integer
    #[error("invalid dnspod domain id '{id}' for domain {domain}")]
    InvalidDomainId {
        /// Raw id as returned by DNSPod
        id: String,
        /// Domain the id belongs to
        domain: String,
    },

    /// The authoritative zone for an FQDN could not be determined
    #[error("could not find the authoritative zone for {fqdn}: {reason}")]
    ZoneResolution {
        /// Name that was being resolved
        fqdn: String,
        /// Why resolution failed
        reason: String,
    },

    /// The Kubernetes client could not be built from the supplied config
    #[error("failed to build Kubernetes client: {0}")]
    KubeClient(#[source] kube::Error),

    /// `present` or `cleanup` was called before `initialize`
    #[error("solver {0} has not been initialized")]
    NotInitialized(&'static str),
}

impl SolverError {
    /// Wrap a DNSPod error with a description of the failing call.
    #[must_use]
    pub fn api(context: impl Into<String>, source: DnspodError) -> Self {
        Self::Api {
            context: context.into(),
            source,
        }
    }
}

/// Result alias for solver operations.
pub type Result<T, E = SolverError> = std::result::Result<T, E>;
