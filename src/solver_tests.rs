// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the DNSPod solver using in-memory collaborators.

#[cfg(test)]
mod tests {
    use crate::challenge::{ChallengeAction, ChallengeRequest};
    use crate::dnspod::{
        Credentials, DnspodApi, DnspodClientFactory, DnspodError, Domain, Record, RecordRequest,
    };
    use crate::errors::{Result, SolverError};
    use crate::secrets::{SecretData, SecretStore};
    use crate::solver::{DnspodSolver, Solver};
    use crate::zone::StaticZoneResolver;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // =====================================================
    // Fakes
    // =====================================================

    #[derive(Default)]
    struct FakeSecretStore {
        secrets: Mutex<HashMap<String, SecretData>>,
        fetches: AtomicUsize,
    }

    impl FakeSecretStore {
        fn put(&self, namespace: &str, name: &str, id: &str, token: &str, version: &str) {
            let mut data = BTreeMap::new();
            data.insert("id".to_string(), id.as_bytes().to_vec());
            data.insert("token".to_string(), token.as_bytes().to_vec());
            self.put_raw(namespace, name, data, version);
        }

        fn put_raw(
            &self,
            namespace: &str,
            name: &str,
            data: BTreeMap<String, Vec<u8>>,
            version: &str,
        ) {
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
    impl SecretStore for FakeSecretStore {
        async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretData> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let key = format!("{namespace}/{name}");
            self.secrets
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or(SolverError::SecretFetch {
                    secret: key,
                    reason: "secrets \"dnspod-credentials\" not found".to_string(),
                })
        }
    }

    /// In-memory DNSPod account. Mirrors DNSPod by answering empty listings
    /// with status 10 "No records".
    #[derive(Default)]
    struct FakeDnspod {
        domains: Mutex<Vec<Domain>>,
        records: Mutex<Vec<(String, Record)>>,
        next_id: AtomicUsize,
        creates: AtomicUsize,
        deletes: AtomicUsize,
        fail_delete: Mutex<bool>,
    }

    impl FakeDnspod {
        fn with_domain(id: &str, name: &str) -> Self {
            let fake = Self::default();
            fake.domains.lock().unwrap().push(Domain {
                id: id.to_string(),
                name: name.to_string(),
            });
            fake
        }

        fn seed_record(&self, domain_id: &str, name: &str, value: &str) -> String {
            let id = format!("seed-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            self.records.lock().unwrap().push((
                domain_id.to_string(),
                Record {
                    id: id.clone(),
                    name: name.to_string(),
                    record_type: "TXT".to_string(),
                    value: value.to_string(),
                    line: "默认".to_string(),
                    ttl: "600".to_string(),
                },
            ));
            id
        }

        fn txt_values(&self, name: &str) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, r)| r.name == name && r.record_type == "TXT")
                .map(|(_, r)| r.value.clone())
                .collect()
        }
    }

    #[async_trait]
    impl DnspodApi for FakeDnspod {
        async fn list_domains(&self) -> std::result::Result<Vec<Domain>, DnspodError> {
            Ok(self.domains.lock().unwrap().clone())
        }

        async fn list_records(
            &self,
            domain_id: &str,
            sub_domain: &str,
            record_type: Option<&str>,
        ) -> std::result::Result<Vec<Record>, DnspodError> {
            let records: Vec<Record> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|(d, r)| {
                    d == domain_id
                        && (sub_domain.is_empty() || r.name == sub_domain)
                        && record_type.is_none_or(|t| r.record_type == t)
                })
                .map(|(_, r)| r.clone())
                .collect();

            if records.is_empty() {
                return Err(DnspodError::Api {
                    code: "10".to_string(),
                    message: "No records".to_string(),
                });
            }
            Ok(records)
        }

        async fn create_record(
            &self,
            domain_id: &str,
            record: &RecordRequest,
        ) -> std::result::Result<String, DnspodError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            self.records.lock().unwrap().push((
                domain_id.to_string(),
                Record {
                    id: id.clone(),
                    name: record.name.clone(),
                    record_type: record.record_type.clone(),
                    value: record.value.clone(),
                    line: record.line.clone(),
                    ttl: record.ttl.clone(),
                },
            ));
            Ok(id)
        }

        async fn delete_record(
            &self,
            domain_id: &str,
            record_id: &str,
        ) -> std::result::Result<(), DnspodError> {
            if *self.fail_delete.lock().unwrap() {
                return Err(DnspodError::Api {
                    code: "-15".to_string(),
                    message: "Domain has been banned".to_string(),
                });
            }
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.records
                .lock()
                .unwrap()
                .retain(|(d, r)| !(d == domain_id && r.id == record_id));
            Ok(())
        }
    }

    struct FakeFactory {
        api: Arc<FakeDnspod>,
        builds: AtomicUsize,
        last_credentials: Mutex<Option<Credentials>>,
    }

    impl FakeFactory {
        fn new(api: Arc<FakeDnspod>) -> Self {
            Self {
                api,
                builds: AtomicUsize::new(0),
                last_credentials: Mutex::new(None),
            }
        }
    }

    impl DnspodClientFactory for FakeFactory {
        fn build(
            &self,
            credentials: &Credentials,
        ) -> std::result::Result<Arc<dyn DnspodApi>, DnspodError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            *self.last_credentials.lock().unwrap() = Some(credentials.clone());
            Ok(self.api.clone())
        }
    }

    struct Harness {
        solver: DnspodSolver,
        secrets: Arc<FakeSecretStore>,
        api: Arc<FakeDnspod>,
        factory: Arc<FakeFactory>,
    }

    fn harness_with(api: FakeDnspod, zones: StaticZoneResolver) -> Harness {
        let secrets = Arc::new(FakeSecretStore::default());
        secrets.put("default", "dnspod-credentials", "12345", "abcdef", "1");
        let api = Arc::new(api);
        let factory = Arc::new(FakeFactory::new(api.clone()));
        let solver = DnspodSolver::with_components(secrets.clone(), Arc::new(zones), factory.clone());
        Harness {
            solver,
            secrets,
            api,
            factory,
        }
    }

    fn harness() -> Harness {
        harness_with(
            FakeDnspod::with_domain("42", "example.com"),
            StaticZoneResolver::new(),
        )
    }

    fn challenge(action: ChallengeAction, key: &str) -> ChallengeRequest {
        ChallengeRequest {
            uid: "uid-1".to_string(),
            action,
            challenge_type: "dns-01".to_string(),
            dns_name: "example.com".to_string(),
            key: key.to_string(),
            resource_namespace: "default".to_string(),
            resolved_fqdn: "_acme-challenge.example.com.".to_string(),
            resolved_zone: "example.com.".to_string(),
            allow_ambient_credentials: false,
            config: None,
        }
    }

    // =====================================================
    // Present / CleanUp
    // =====================================================

    #[test]
    fn test_solver_name() {
        assert_eq!(harness().solver.name(), "dnspodchallenger");
    }

    #[tokio::test]
    async fn test_present_creates_txt_record() {
        let h = harness();

        h.solver
            .present(&challenge(ChallengeAction::Present, "abc123"))
            .await
            .unwrap();

        let records = h.api.records.lock().unwrap().clone();
        assert_eq!(records.len(), 1);
        let (domain_id, record) = &records[0];
        assert_eq!(domain_id, "42");
        assert_eq!(record.name, "_acme-challenge");
        assert_eq!(record.record_type, "TXT");
        assert_eq!(record.value, "abc123");
        assert_eq!(record.line, "默认");
        assert_eq!(record.ttl, "600");
    }

    #[tokio::test]
    async fn test_present_uses_configured_ttl() {
        let h = harness();
        let mut ch = challenge(ChallengeAction::Present, "abc123");
        ch.config = Some(json!({"ttl": 120}));

        h.solver.present(&ch).await.unwrap();

        assert_eq!(h.api.records.lock().unwrap()[0].1.ttl, "120");
    }

    #[tokio::test]
    async fn test_present_twice_creates_one_record() {
        let h = harness();
        let ch = challenge(ChallengeAction::Present, "abc123");

        h.solver.present(&ch).await.unwrap();
        h.solver.present(&ch).await.unwrap();

        assert_eq!(h.api.creates.load(Ordering::SeqCst), 1);
        assert_eq!(h.api.txt_values("_acme-challenge"), vec!["abc123"]);
    }

    #[tokio::test]
    async fn test_present_alongside_other_key() {
        let h = harness();
        h.api.seed_record("42", "_acme-challenge", "other-key");

        h.solver
            .present(&challenge(ChallengeAction::Present, "abc123"))
            .await
            .unwrap();

        let mut values = h.api.txt_values("_acme-challenge");
        values.sort();
        assert_eq!(values, vec!["abc123", "other-key"]);
    }

    #[tokio::test]
    async fn test_present_then_cleanup_round_trip() {
        let h = harness();

        h.solver
            .present(&challenge(ChallengeAction::Present, "abc123"))
            .await
            .unwrap();
        h.solver
            .cleanup(&challenge(ChallengeAction::CleanUp, "abc123"))
            .await
            .unwrap();

        assert!(h.api.txt_values("_acme-challenge").is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_only_deletes_matching_value() {
        let h = harness();
        h.api.seed_record("42", "_acme-challenge", "abc123");
        h.api.seed_record("42", "_acme-challenge", "other-key");
        h.api.seed_record("42", "www", "abc123");

        h.solver
            .cleanup(&challenge(ChallengeAction::CleanUp, "abc123"))
            .await
            .unwrap();

        assert_eq!(h.api.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(h.api.txt_values("_acme-challenge"), vec!["other-key"]);
        assert_eq!(h.api.txt_values("www"), vec!["abc123"]);
    }

    #[tokio::test]
    async fn test_cleanup_deletes_duplicates() {
        let h = harness();
        h.api.seed_record("42", "_acme-challenge", "abc123");
        h.api.seed_record("42", "_acme-challenge", "abc123");

        h.solver
            .cleanup(&challenge(ChallengeAction::CleanUp, "abc123"))
            .await
            .unwrap();

        assert_eq!(h.api.deletes.load(Ordering::SeqCst), 2);
        assert!(h.api.txt_values("_acme-challenge").is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_with_no_records_succeeds() {
        let h = harness();

        h.solver
            .cleanup(&challenge(ChallengeAction::CleanUp, "abc123"))
            .await
            .unwrap();

        assert_eq!(h.api.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cleanup_delete_failure_is_returned() {
        let h = harness();
        h.api.seed_record("42", "_acme-challenge", "abc123");
        *h.api.fail_delete.lock().unwrap() = true;

        let err = h
            .solver
            .cleanup(&challenge(ChallengeAction::CleanUp, "abc123"))
            .await
            .unwrap_err();

        assert!(matches!(err, SolverError::Api { .. }));
        assert!(err.to_string().contains("Domain has been banned"));
    }

    // =====================================================
    // Domain lookup
    // =====================================================

    #[tokio::test]
    async fn test_zone_not_hosted() {
        let h = harness_with(
            FakeDnspod::with_domain("42", "example.org"),
            StaticZoneResolver::new(),
        );

        let err = h
            .solver
            .present(&challenge(ChallengeAction::Present, "abc123"))
            .await
            .unwrap_err();

        assert!(matches!(err, SolverError::ZoneNotFound { .. }));
        assert_eq!(h.api.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_domain_id_is_not_found() {
        let h = harness_with(
            FakeDnspod::with_domain("0", "example.com"),
            StaticZoneResolver::new(),
        );

        let err = h
            .solver
            .present(&challenge(ChallengeAction::Present, "abc123"))
            .await
            .unwrap_err();

        assert!(matches!(err, SolverError::ZoneNotFound { .. }));
    }

    #[tokio::test]
    async fn test_non_numeric_domain_id() {
        let h = harness_with(
            FakeDnspod::with_domain("abc", "example.com"),
            StaticZoneResolver::new(),
        );

        let err = h
            .solver
            .present(&challenge(ChallengeAction::Present, "abc123"))
            .await
            .unwrap_err();

        assert!(matches!(err, SolverError::InvalidDomainId { .. }));
    }

    #[tokio::test]
    async fn test_first_matching_domain_wins() {
        let api = FakeDnspod::with_domain("42", "example.com");
        api.domains.lock().unwrap().push(Domain {
            id: "43".to_string(),
            name: "example.com".to_string(),
        });
        let h = harness_with(api, StaticZoneResolver::new());

        let client: Arc<dyn DnspodApi> = h.api.clone();
        let id = h
            .solver
            .get_domain_id(client.as_ref(), "example.com.")
            .await
            .unwrap();

        assert_eq!(id, "42");
    }

    #[tokio::test]
    async fn test_domain_matched_through_authoritative_zone() {
        let h = harness_with(
            FakeDnspod::with_domain("42", "example.com"),
            StaticZoneResolver::new().with_zone("sub.example.com.", "example.com."),
        );

        let client: Arc<dyn DnspodApi> = h.api.clone();
        let id = h
            .solver
            .get_domain_id(client.as_ref(), "sub.example.com.")
            .await
            .unwrap();

        assert_eq!(id, "42");
    }

    // =====================================================
    // Credentials and cache
    // =====================================================

    #[tokio::test]
    async fn test_credentials_from_configured_secret() {
        let h = harness();
        h.secrets
            .put("cert-manager", "my-dnspod", "999", "tok", "5");
        let mut ch = challenge(ChallengeAction::Present, "abc123");
        ch.config = Some(json!({
            "apiTokenSecret": {"name": "my-dnspod", "namespace": "cert-manager"}
        }));

        h.solver.present(&ch).await.unwrap();

        let credentials = h.factory.last_credentials.lock().unwrap().clone().unwrap();
        assert_eq!(credentials.login_token(), "999,tok");
    }

    #[tokio::test]
    async fn test_unchanged_secret_reuses_client() {
        let h = harness();
        let ch = challenge(ChallengeAction::Present, "abc123");

        h.solver.present(&ch).await.unwrap();
        h.solver.cleanup(&ch).await.unwrap();

        assert_eq!(h.factory.builds.load(Ordering::SeqCst), 1);
        assert_eq!(h.secrets.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_changed_secret_version_rebuilds_client() {
        let h = harness();
        let ch = challenge(ChallengeAction::Present, "abc123");

        h.solver.present(&ch).await.unwrap();
        h.secrets
            .put("default", "dnspod-credentials", "12345", "rotated", "2");
        h.solver.cleanup(&ch).await.unwrap();

        assert_eq!(h.factory.builds.load(Ordering::SeqCst), 2);
        let credentials = h.factory.last_credentials.lock().unwrap().clone().unwrap();
        assert_eq!(credentials.token, "rotated");
    }

    #[tokio::test]
    async fn test_missing_token_in_secret() {
        let h = harness();
        let mut data = BTreeMap::new();
        data.insert("id".to_string(), b"12345".to_vec());
        h.secrets.put_raw("default", "dnspod-credentials", data, "9");

        let err = h
            .solver
            .present(&challenge(ChallengeAction::Present, "abc123"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "no `token` in secret 'default/dnspod-credentials'"
        );
        assert_eq!(h.factory.builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_secret_is_propagated() {
        let h = harness();
        let mut ch = challenge(ChallengeAction::Present, "abc123");
        ch.config = Some(json!({"apiTokenSecret": {"name": "absent"}}));

        let err = h.solver.present(&ch).await.unwrap_err();

        assert!(matches!(err, SolverError::SecretFetch { .. }));
    }

    #[tokio::test]
    async fn test_malformed_config_fails_before_secret_fetch() {
        let h = harness();
        let mut ch = challenge(ChallengeAction::Present, "abc123");
        ch.config = Some(json!({"ttl": "ten minutes"}));

        let err = h.solver.present(&ch).await.unwrap_err();

        assert!(matches!(err, SolverError::ConfigDecode(_)));
        assert_eq!(h.secrets.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_uninitialized_solver() {
        let solver = DnspodSolver::new("https://dnsapi.cn");

        let err = solver
            .present(&challenge(ChallengeAction::Present, "abc123"))
            .await
            .unwrap_err();

        assert!(matches!(err, SolverError::NotInitialized(_)));
    }
}
