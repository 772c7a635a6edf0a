// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential-keyed cache of DNSPod API clients.
//!
//! Entries are keyed by the Secret reference (`namespace/name`) and remember the
//! Secret `resourceVersion` the client was built from. An entry is reused only
//! while that version matches the live Secret; otherwise it is rebuilt in place.
//! Entries live for the lifetime of the process.
//!
//! The map is shared by every concurrent `present`/`cleanup` call, so the
//! check-and-replace step runs under a single mutex acquisition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A cached client and the Secret version it was built from.
#[derive(Debug)]
pub struct CachedClient<C: ?Sized> {
    pub client: Arc<C>,
    pub secret_version: String,
}

/// Mutex-guarded map from Secret reference to cached client.
#[derive(Debug)]
pub struct CredentialCache<C: ?Sized> {
    entries: Mutex<HashMap<String, CachedClient<C>>>,
}

impl<C: ?Sized> Default for CredentialCache<C> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<C: ?Sized> CredentialCache<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the client cached under `key`, rebuilding it when it is missing or
    /// was built from a different Secret version.
    ///
    /// # Errors
    ///
    /// Returns the error from `build`; the cache is left unchanged in that case.
    pub fn get_or_rebuild<E>(
        &self,
        key: &str,
        version: &str,
        build: impl FnOnce() -> Result<Arc<C>, E>,
    ) -> Result<Arc<C>, E> {
        let mut entries = self.lock();

        if let Some(cached) = entries.get(key) {
            if cached.secret_version == version {
                return Ok(Arc::clone(&cached.client));
            }
            debug!(
                secret = %key,
                cached_version = %cached.secret_version,
                live_version = %version,
                "Secret version changed, rebuilding DNSPod client"
            );
        } else {
            debug!(secret = %key, "No cached DNSPod client, building one");
        }

        let client = build()?;
        entries.insert(
            key.to_string(),
            CachedClient {
                client: Arc::clone(&client),
                secret_version: version.to_string(),
            },
        );
        Ok(client)
    }

    /// Secret version of the entry under `key`, if any.
    #[must_use]
    pub fn version(&self, key: &str) -> Option<String> {
        self.lock().get(key).map(|c| c.secret_version.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave an entry half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedClient<C>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod cache_tests;
