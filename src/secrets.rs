// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Access to the Kubernetes Secrets holding DNSPod credentials.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::{SECRET_KEY_ID, SECRET_KEY_TOKEN};
use crate::dnspod::Credentials;
use crate::errors::{Result, SolverError};

/// Snapshot of a Secret: its data and the version it was read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretData {
    /// Decoded secret data
    pub data: BTreeMap<String, Vec<u8>>,
    /// `metadata.resourceVersion`; changes whenever the Secret is updated
    pub version: String,
}

impl SecretData {
    /// Extract DNSPod credentials from the `id` and `token` keys.
    ///
    /// `secret` is the `namespace/name` reference used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MissingCredential`] when a key is absent and
    /// [`SolverError::InvalidCredential`] when its value is not UTF-8.
    pub fn credentials(&self, secret: &str) -> Result<Credentials> {
        Ok(Credentials {
            id: self.field(SECRET_KEY_ID, secret)?,
            token: self.field(SECRET_KEY_TOKEN, secret)?,
        })
    }

    fn field(&self, field: &'static str, secret: &str) -> Result<String> {
        let bytes = self
            .data
            .get(field)
            .ok_or_else(|| SolverError::MissingCredential {
                field,
                secret: secret.to_string(),
            })?;

        String::from_utf8(bytes.clone())
            .map(|value| value.trim().to_string())
            .map_err(|_| SolverError::InvalidCredential {
                field,
                secret: secret.to_string(),
            })
    }
}

/// Read access to cluster Secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the Secret `namespace/name`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::SecretFetch`] if the Secret cannot be read.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData>;
}

/// [`SecretStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData> {
        let secret_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let secret = secret_api
            .get(name)
            .await
            .map_err(|e| SolverError::SecretFetch {
                secret: format!("{namespace}/{name}"),
                reason: e.to_string(),
            })?;

        debug!(
            namespace = %namespace,
            name = %name,
            resource_version = ?secret.metadata.resource_version,
            "Fetched credentials secret"
        );

        // Convert ByteString to Vec<u8>
        let data = secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, value.0))
            .collect();

        Ok(SecretData {
            data,
            version: secret.metadata.resource_version.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod secrets_tests;
