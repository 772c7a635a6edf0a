// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP client for the DNSPod API.
//!
//! Every call is a form-encoded `POST` to `{endpoint}/{Action}` carrying the
//! common parameters `login_token`, `format=json` and `lang=en`. DNSPod answers
//! with HTTP 200 and reports the outcome in the `status` block, so a response
//! is only successful when `status.code` is `"1"`.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

use super::error::DnspodError;
use super::types::{
    CreatedRecord, Credentials, Domain, DomainList, Empty, Envelope, Record, RecordList,
    RecordRequest,
};
use super::DnspodApi;
use crate::constants::{DNSPOD_HTTP_TIMEOUT_SECS, DNSPOD_STATUS_SUCCESS, DNSPOD_USER_AGENT};

/// DNSPod API client bound to one set of credentials.
#[derive(Clone)]
pub struct DnspodClient {
    http: HttpClient,
    endpoint: String,
    login_token: String,
}

impl fmt::Debug for DnspodClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnspodClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl DnspodClient {
    /// Create a client for `endpoint` (e.g. `https://dnsapi.cn`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(credentials: &Credentials, endpoint: &str) -> Result<Self, DnspodError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let http = HttpClient::builder()
            .user_agent(DNSPOD_USER_AGENT)
            .timeout(Duration::from_secs(DNSPOD_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|source| DnspodError::Http {
                url: endpoint.clone(),
                source,
            })?;

        Ok(Self {
            http,
            endpoint,
            login_token: credentials.login_token(),
        })
    }

    /// Base URL this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one API action and decode its body.
    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, &str)],
    ) -> Result<T, DnspodError> {
        let url = format!("{}/{action}", self.endpoint);

        let mut form: Vec<(&str, &str)> = vec![
            ("login_token", self.login_token.as_str()),
            ("format", "json"),
            ("lang", "en"),
        ];
        form.extend_from_slice(params);

        debug!(action = %action, params = ?params, "DNSPod API request");

        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|source| DnspodError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(action = %action, status = %status, "DNSPod API returned HTTP error");
            return Err(DnspodError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| DnspodError::Http {
            url: url.clone(),
            source,
        })?;

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|source| DnspodError::Decode {
                url: url.clone(),
                source,
            })?;

        if envelope.status.code != DNSPOD_STATUS_SUCCESS {
            debug!(
                action = %action,
                code = %envelope.status.code,
                message = %envelope.status.message,
                "DNSPod API reported failure"
            );
            return Err(DnspodError::Api {
                code: envelope.status.code,
                message: envelope.status.message,
            });
        }

        Ok(envelope.body)
    }
}

#[async_trait]
impl DnspodApi for DnspodClient {
    async fn list_domains(&self) -> Result<Vec<Domain>, DnspodError> {
        let list: DomainList = self.call("Domain.List", &[]).await?;
        Ok(list.domains)
    }

    async fn list_records(
        &self,
        domain_id: &str,
        sub_domain: &str,
        record_type: Option<&str>,
    ) -> Result<Vec<Record>, DnspodError> {
        let mut params = vec![("domain_id", domain_id)];
        if !sub_domain.is_empty() {
            params.push(("sub_domain", sub_domain));
        }
        if let Some(record_type) = record_type {
            params.push(("record_type", record_type));
        }

        let list: RecordList = self.call("Record.List", &params).await?;
        Ok(list.records)
    }

    async fn create_record(
        &self,
        domain_id: &str,
        record: &RecordRequest,
    ) -> Result<String, DnspodError> {
        let params = [
            ("domain_id", domain_id),
            ("sub_domain", record.name.as_str()),
            ("record_type", record.record_type.as_str()),
            ("record_line", record.line.as_str()),
            ("value", record.value.as_str()),
            ("ttl", record.ttl.as_str()),
        ];

        let created: CreatedRecord = self.call("Record.Create", &params).await?;
        Ok(created.record.map(|r| r.id).unwrap_or_default())
    }

    async fn delete_record(&self, domain_id: &str, record_id: &str) -> Result<(), DnspodError> {
        let params = [("domain_id", domain_id), ("record_id", record_id)];
        let _: Empty = self.call("Record.Remove", &params).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
