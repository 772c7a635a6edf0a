// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The DNSPod DNS-01 solver.
//!
//! cert-manager drives every webhook solver through the same four operations,
//! captured here by the [`Solver`] trait. [`DnspodSolver`] implements them
//! against DNSPod:
//!
//! - **present**: decode config → resolve client → locate domain → create the
//!   TXT record unless one with the same value already exists
//! - **cleanup**: decode config → resolve client → locate domain → delete every
//!   TXT record at the challenge name whose value is the challenge key
//!
//! Both operations are stateless apart from the credential cache, and neither
//! retries: errors go straight back to cert-manager, which re-invokes the
//! webhook on its own schedule.

use async_trait::async_trait;
use kube::Client;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::CredentialCache;
use crate::challenge::ChallengeRequest;
use crate::config::{load_config, SolverConfig};
use crate::constants::{DNSPOD_API_ENDPOINT, SOLVER_NAME, TXT_RECORD_TYPE};
use crate::dnspod::{DnspodApi, DnspodClientFactory, DnspodError, HttpClientFactory, Record};
use crate::errors::{Result, SolverError};
use crate::records::{extract_record_name, new_txt_record, records_with_value};
use crate::secrets::{KubeSecretStore, SecretStore};
use crate::zone::{un_fqdn, RecursiveZoneResolver, ZoneResolver};

/// Capability contract every cert-manager webhook solver fulfils.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Name the solver is referenced by on the Issuer (`solverName`).
    ///
    /// Must be unique within one webhook deployment.
    fn name(&self) -> &str;

    /// Prepare the solver; called once at startup before any challenge.
    ///
    /// `stop` flips to `true` when the process is shutting down.
    async fn initialize(
        &mut self,
        kube_config: kube::Config,
        stop: watch::Receiver<bool>,
    ) -> Result<()>;

    /// Make the challenge TXT record visible. Called repeatedly with the same
    /// request until cert-manager's self check passes.
    async fn present(&self, ch: &ChallengeRequest) -> Result<()>;

    /// Remove the challenge TXT record, leaving records for other keys intact.
    async fn cleanup(&self, ch: &ChallengeRequest) -> Result<()>;
}

/// DNS-01 solver backed by DNSPod.
pub struct DnspodSolver {
    secrets: Option<Arc<dyn SecretStore>>,
    zones: Arc<dyn ZoneResolver>,
    factory: Arc<dyn DnspodClientFactory>,
    cache: CredentialCache<dyn DnspodApi>,
}

impl DnspodSolver {
    /// Solver talking to `dnspod_endpoint`, resolving zones with the system
    /// nameservers. The secret store is attached by [`Solver::initialize`].
    #[must_use]
    pub fn new(dnspod_endpoint: &str) -> Self {
        Self {
            secrets: None,
            zones: Arc::new(RecursiveZoneResolver::from_system()),
            factory: Arc::new(HttpClientFactory::new(dnspod_endpoint)),
            cache: CredentialCache::new(),
        }
    }

    /// Solver assembled from explicit collaborators; needs no `initialize`.
    #[must_use]
    pub fn with_components(
        secrets: Arc<dyn SecretStore>,
        zones: Arc<dyn ZoneResolver>,
        factory: Arc<dyn DnspodClientFactory>,
    ) -> Self {
        Self {
            secrets: Some(secrets),
            zones,
            factory,
            cache: CredentialCache::new(),
        }
    }

    /// Resolve the DNSPod client for the Secret referenced by `cfg`.
    ///
    /// The Secret is fetched on every call; the client is rebuilt only when the
    /// Secret is new to the cache or its version changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the Secret cannot be fetched, lacks `id`/`token`, or
    /// the client cannot be built.
    pub async fn dnspod_client(&self, cfg: &SolverConfig) -> Result<Arc<dyn DnspodApi>> {
        let secrets = self
            .secrets
            .as_ref()
            .ok_or(SolverError::NotInitialized(SOLVER_NAME))?;

        let secret_ref = &cfg.api_token_secret;
        let key = secret_ref.to_string();
        let secret = secrets
            .get_secret(&secret_ref.namespace, &secret_ref.name)
            .await?;

        self.cache.get_or_rebuild(&key, &secret.version, || {
            let credentials = secret.credentials(&key)?;
            info!(secret = %key, version = %secret.version, "Building DNSPod client");
            self.factory
                .build(&credentials)
                .map_err(|e| SolverError::api("failed to build dnspod client", e))
        })
    }

    /// Find the DNSPod domain id hosting `zone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain list cannot be fetched, the authoritative
    /// zone cannot be determined or is not hosted in the account, or its id is
    /// not a non-zero integer.
    pub async fn get_domain_id(&self, client: &dyn DnspodApi, zone: &str) -> Result<String> {
        let domains = client
            .list_domains()
            .await
            .map_err(|e| SolverError::api("dnspod API call failed", e))?;

        let auth_zone = self.zones.find_authoritative_zone(zone).await?;
        let wanted = un_fqdn(&auth_zone);

        let Some(domain) = domains.iter().find(|d| d.name == wanted) else {
            return Err(SolverError::ZoneNotFound {
                auth_zone,
                zone: zone.to_string(),
            });
        };

        let id: i64 = domain
            .id
            .parse()
            .map_err(|_| SolverError::InvalidDomainId {
                id: domain.id.clone(),
                domain: domain.name.clone(),
            })?;
        if id == 0 {
            return Err(SolverError::ZoneNotFound {
                auth_zone,
                zone: zone.to_string(),
            });
        }

        debug!(zone = %zone, domain = %domain.name, domain_id = id, "Matched DNSPod domain");
        Ok(id.to_string())
    }
}

/// List TXT records named `name`; DNSPod's "No records" answer is an empty list.
async fn find_txt_records(
    client: &dyn DnspodApi,
    domain_id: &str,
    name: &str,
) -> std::result::Result<Vec<Record>, DnspodError> {
    match client
        .list_records(domain_id, name, Some(TXT_RECORD_TYPE))
        .await
    {
        Ok(records) => Ok(records),
        Err(e) if e.is_no_records() => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl Solver for DnspodSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn initialize(
        &mut self,
        kube_config: kube::Config,
        _stop: watch::Receiver<bool>,
    ) -> Result<()> {
        let client = Client::try_from(kube_config).map_err(SolverError::KubeClient)?;
        self.secrets = Some(Arc::new(KubeSecretStore::new(client)));
        self.cache = CredentialCache::new();

        info!(solver = SOLVER_NAME, "Solver initialized");
        Ok(())
    }

    async fn present(&self, ch: &ChallengeRequest) -> Result<()> {
        let cfg = load_config(ch.config.as_ref())?;
        let client = self.dnspod_client(&cfg).await?;
        let domain_id = self.get_domain_id(client.as_ref(), &ch.resolved_zone).await?;

        let record = new_txt_record(&ch.resolved_zone, &ch.resolved_fqdn, &ch.key, cfg.ttl);

        let existing = find_txt_records(client.as_ref(), &domain_id, &record.name)
            .await
            .map_err(|e| SolverError::api("dnspod API call failed", e))?;
        if let Some(found) = records_with_value(&existing, &ch.key).next() {
            info!(
                fqdn = %ch.resolved_fqdn,
                record_id = %found.id,
                "Challenge record already present"
            );
            return Ok(());
        }

        let record_id = client
            .create_record(&domain_id, &record)
            .await
            .map_err(|e| SolverError::api("dnspod API call failed", e))?;

        info!(
            fqdn = %ch.resolved_fqdn,
            name = %record.name,
            domain_id = %domain_id,
            record_id = %record_id,
            ttl = cfg.ttl,
            "Presented challenge record"
        );
        Ok(())
    }

    async fn cleanup(&self, ch: &ChallengeRequest) -> Result<()> {
        let cfg = load_config(ch.config.as_ref())?;
        let client = self.dnspod_client(&cfg).await?;
        let domain_id = self.get_domain_id(client.as_ref(), &ch.resolved_zone).await?;

        let name = extract_record_name(&ch.resolved_fqdn, &ch.resolved_zone);
        let records = find_txt_records(client.as_ref(), &domain_id, &name)
            .await
            .map_err(|e| SolverError::api("dnspod API call has failed", e))?;

        for record in records_with_value(&records, &ch.key) {
            client
                .delete_record(&domain_id, &record.id)
                .await
                .map_err(|e| SolverError::api(format!("failed to delete record {}", record.id), e))?;

            info!(
                fqdn = %ch.resolved_fqdn,
                domain_id = %domain_id,
                record_id = %record.id,
                "Cleaned up challenge record"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod solver_tests;
