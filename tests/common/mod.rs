// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dnspod_webhook::challenge::{ChallengeAction, ChallengeRequest};
use dnspod_webhook::dnspod::HttpClientFactory;
use dnspod_webhook::errors::{Result, SolverError};
use dnspod_webhook::secrets::{SecretData, SecretStore};
use dnspod_webhook::solver::DnspodSolver;
use dnspod_webhook::zone::StaticZoneResolver;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// In-memory Secret store keyed by `namespace/name`.
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, SecretData>>,
}

impl MemorySecretStore {
    pub fn with_credentials(namespace: &str, name: &str, id: &str, token: &str) -> Self {
        let store = Self::default();
        store.put(namespace, name, id, token, "1");
        store
    }

    pub fn put(&self, namespace: &str, name: &str, id: &str, token: &str, version: &str) {
        let mut data = BTreeMap::new();
        data.insert("id".to_string(), id.as_bytes().to_vec());
        data.insert("token".to_string(), token.as_bytes().to_vec());
        self.secrets.lock().unwrap().insert(
            format!("{namespace}/{name}"),
            SecretData {
                data,
                version: version.to_string(),
            },
        );
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData> {
        let key = format!("{namespace}/{name}");
        self.secrets
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(SolverError::SecretFetch {
                secret: key,
                reason: "secrets not found".to_string(),
            })
    }
}

/// Solver wired to a DNSPod endpoint, the given Secret store and zone table.
pub fn solver_for(
    endpoint: &str,
    secrets: MemorySecretStore,
    zones: StaticZoneResolver,
) -> DnspodSolver {
    DnspodSolver::with_components(
        Arc::new(secrets),
        Arc::new(zones),
        Arc::new(HttpClientFactory::new(endpoint)),
    )
}

/// A DNS-01 challenge for `fqdn` in `zone`, using the default credentials Secret.
pub fn challenge(action: ChallengeAction, fqdn: &str, zone: &str, key: &str) -> ChallengeRequest {
    ChallengeRequest {
        uid: "integration".to_string(),
        action,
        challenge_type: "dns-01".to_string(),
        dns_name: fqdn.trim_start_matches("_acme-challenge.").trim_end_matches('.').to_string(),
        key: key.to_string(),
        resource_namespace: "default".to_string(),
        resolved_fqdn: fqdn.to_string(),
        resolved_zone: zone.to_string(),
        allow_ambient_credentials: false,
        config: Some(json!({"ttl": 600})),
    }
}

/// DNSPod success status block.
pub fn ok_status() -> serde_json::Value {
    json!({"code": "1", "message": "Action completed successful"})
}

/// DNSPod "No records" status block.
pub fn no_records_status() -> serde_json::Value {
    json!({"code": "10", "message": "No records"})
}
