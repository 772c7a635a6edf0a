// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNSPod API access.
//!
//! The solver only needs four calls from DNSPod: list the hosted domains, list
//! the records of a domain, create a record and remove a record. They are
//! expressed by the [`DnspodApi`] trait so the solver can be exercised without
//! network access; [`DnspodClient`] is the real implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use dnspod_webhook::dnspod::{Credentials, DnspodApi, DnspodClient};
//!
//! # async fn example() -> Result<(), dnspod_webhook::dnspod::DnspodError> {
//! let credentials = Credentials {
//!     id: "12345".to_string(),
//!     token: "secret-token".to_string(),
//! };
//! let client = DnspodClient::new(&credentials, "https://dnsapi.cn")?;
//! for domain in client.list_domains().await? {
//!     println!("{} {}", domain.id, domain.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::DnspodClient;
pub use error::DnspodError;
pub use types::{Credentials, Domain, Record, RecordRequest, Status};

use async_trait::async_trait;
use std::sync::Arc;

/// Operations the solver performs against DNSPod.
#[async_trait]
pub trait DnspodApi: Send + Sync {
    /// List all domains hosted in the account.
    async fn list_domains(&self) -> Result<Vec<Domain>, DnspodError>;

    /// List records of `domain_id`, filtered by relative name and, optionally, type.
    ///
    /// An empty `sub_domain` lists every record of the domain.
    async fn list_records(
        &self,
        domain_id: &str,
        sub_domain: &str,
        record_type: Option<&str>,
    ) -> Result<Vec<Record>, DnspodError>;

    /// Create a record and return its DNSPod id.
    async fn create_record(
        &self,
        domain_id: &str,
        record: &RecordRequest,
    ) -> Result<String, DnspodError>;

    /// Remove a record by id.
    async fn delete_record(&self, domain_id: &str, record_id: &str) -> Result<(), DnspodError>;
}

/// Builds DNSPod clients from credentials.
///
/// The credential cache calls this only when a Secret is first seen or its
/// version changes.
pub trait DnspodClientFactory: Send + Sync {
    /// Build a client for `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed.
    fn build(&self, credentials: &Credentials) -> Result<Arc<dyn DnspodApi>, DnspodError>;
}

/// Factory producing [`DnspodClient`]s for a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    endpoint: String,
}

impl HttpClientFactory {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl DnspodClientFactory for HttpClientFactory {
    fn build(&self, credentials: &Credentials) -> Result<Arc<dyn DnspodApi>, DnspodError> {
        Ok(Arc::new(DnspodClient::new(credentials, &self.endpoint)?))
    }
}
