// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dnspod-webhook - cert-manager DNS-01 solver for DNSPod
//!
//! This crate implements a cert-manager webhook solver that answers ACME
//! DNS-01 challenges by creating and removing TXT records through the DNSPod
//! API.
//!
//! ## Overview
//!
//! For every challenge the solver:
//!
//! - decodes the per-Issuer configuration ([`config`])
//! - loads DNSPod credentials from a Kubernetes Secret and reuses a cached
//!   client while the Secret is unchanged ([`secrets`], [`cache`])
//! - finds the DNSPod domain hosting the authoritative zone ([`zone`])
//! - creates or deletes the TXT record ([`solver`], [`records`])
//!
//! ## Modules
//!
//! - [`solver`] - The `Solver` trait and the DNSPod implementation
//! - [`dnspod`] - DNSPod API client
//! - [`webhook`] - HTTP front dispatching cert-manager payloads to solvers
//! - [`challenge`] - cert-manager `ChallengePayload` documents
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use dnspod_webhook::challenge::{ChallengeAction, ChallengeRequest};
//! use dnspod_webhook::solver::{DnspodSolver, Solver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut solver = DnspodSolver::new("https://dnsapi.cn");
//! let (_stop_tx, stop_rx) = tokio::sync::watch::channel(false);
//! solver.initialize(kube::Config::infer().await?, stop_rx).await?;
//!
//! let challenge = ChallengeRequest {
//!     uid: "1".to_string(),
//!     action: ChallengeAction::Present,
//!     challenge_type: "dns-01".to_string(),
//!     dns_name: "example.com".to_string(),
//!     key: "abc123".to_string(),
//!     resource_namespace: "default".to_string(),
//!     resolved_fqdn: "_acme-challenge.example.com.".to_string(),
//!     resolved_zone: "example.com.".to_string(),
//!     allow_ambient_credentials: false,
//!     config: None,
//! };
//! solver.present(&challenge).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod challenge;
pub mod config;
pub mod constants;
pub mod dnspod;
pub mod errors;
pub mod metrics;
pub mod records;
pub mod secrets;
pub mod solver;
pub mod webhook;
pub mod zone;
