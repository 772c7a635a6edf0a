// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! cert-manager webhook challenge documents.
//!
//! cert-manager talks to DNS-01 webhooks by posting a `ChallengePayload`
//! (`webhook.acme.cert-manager.io/v1alpha1`) whose `request` describes the
//! challenge. The webhook answers with the same document, its `response`
//! filled in.
//!
//! ```json
//! {
//!   "apiVersion": "webhook.acme.cert-manager.io/v1alpha1",
//!   "kind": "ChallengePayload",
//!   "request": {
//!     "uid": "6f1f5c1e-...",
//!     "action": "Present",
//!     "type": "dns-01",
//!     "dnsName": "example.com",
//!     "key": "abc123",
//!     "resourceNamespace": "default",
//!     "resolvedFQDN": "_acme-challenge.example.com.",
//!     "resolvedZone": "example.com.",
//!     "allowAmbientCredentials": false,
//!     "config": {"apiTokenSecret": {"name": "dnspod-credentials"}}
//!   }
//! }
//! ```

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use serde::{Deserialize, Serialize};

use crate::constants::{CHALLENGE_PAYLOAD_API_VERSION, CHALLENGE_PAYLOAD_KIND};

/// What cert-manager asks the solver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    Present,
    CleanUp,
}

impl ChallengeAction {
    /// Lower-case label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::CleanUp => "cleanup",
        }
    }
}

/// One DNS-01 challenge instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Identifies this exchange; echoed in the response
    #[serde(default)]
    pub uid: String,
    pub action: ChallengeAction,
    /// Challenge type, always `dns-01` for this webhook
    #[serde(rename = "type", default)]
    pub challenge_type: String,
    /// Name on the certificate the challenge is for
    #[serde(default)]
    pub dns_name: String,
    /// Value the TXT record must hold
    pub key: String,
    /// Namespace of the Issuer/Challenge resource
    #[serde(default)]
    pub resource_namespace: String,
    /// FQDN of the TXT record, with trailing dot
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    /// Zone the record belongs to, with trailing dot
    pub resolved_zone: String,
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    /// Opaque solver configuration from the Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Outcome reported back to cert-manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ChallengeResponse {
    #[must_use]
    pub fn success(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            success: true,
            status: None,
        }
    }

    /// Failed response carrying `message` as a `Failure` status.
    #[must_use]
    pub fn failure(uid: &str, message: impl Into<String>) -> Self {
        Self {
            uid: uid.to_string(),
            success: false,
            status: Some(Status {
                status: Some("Failure".to_string()),
                message: Some(message.into()),
                ..Status::default()
            }),
        }
    }
}

/// Envelope exchanged between cert-manager and the webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengePayload {
    /// Reply to this payload with `response`, keeping the request.
    #[must_use]
    pub fn respond(mut self, response: ChallengeResponse) -> Self {
        self.response = Some(response);
        self
    }
}

fn default_api_version() -> String {
    CHALLENGE_PAYLOAD_API_VERSION.to_string()
}

fn default_kind() -> String {
    CHALLENGE_PAYLOAD_KIND.to_string()
}
