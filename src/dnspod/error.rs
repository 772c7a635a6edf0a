// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNSPod API error types.

use thiserror::Error;

use crate::constants::{DNSPOD_NO_RECORDS_MESSAGE, DNSPOD_STATUS_NO_RECORDS};

/// Errors that can occur when calling the DNSPod HTTP API.
#[derive(Error, Debug)]
pub enum DnspodError {
    /// The request could not be sent or the response body could not be read
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        /// URL that was called
        url: String,
        /// Transport error from reqwest
        #[source]
        source: reqwest::Error,
    },

    /// DNSPod answered with a non-2xx HTTP status
    #[error("unexpected HTTP status {status} from {url}")]
    Status {
        /// URL that was called
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body is not the JSON document DNSPod documents
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// URL that was called
        url: String,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// DNSPod processed the request and reported a failure status
    #[error("dnspod returned status {code}: {message}")]
    Api {
        /// DNSPod status code (`"1"` means success and never appears here)
        code: String,
        /// Human readable message from DNSPod
        message: String,
    },
}

impl DnspodError {
    /// Whether this is DNSPod's answer to a record listing that matched nothing.
    #[must_use]
    pub fn is_no_records(&self) -> bool {
        match self {
            Self::Api { code, message } => {
                code == DNSPOD_STATUS_NO_RECORDS || message.contains(DNSPOD_NO_RECORDS_MESSAGE)
            }
            _ => false,
        }
    }
}
