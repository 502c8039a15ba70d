//! Mock store for testing.
//!
//! This store keeps everything in memory. It can serve fixed secrets, mint a
//! fresh lease on every read the way a dynamic AWS role does, pretend that
//! credentials are still being provisioned, and inject errors.

use crate::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A role that issues new credentials on every read.
#[derive(Debug, Clone, Copy)]
struct DynamicRole {
    credential_type: CredentialType,
    lease_duration: i64,
    renewable: bool,
}

impl DynamicRole {
    fn issue(&self, path: &str) -> Secret {
        let lease = Uuid::new_v4().simple().to_string();
        let key_id: String = lease.to_uppercase().chars().take(16).collect();

        let mut secret = Secret::leased(format!("{}/{}", path, lease), self.lease_duration, self.renewable)
            .with_data("access_key", format!("AKIA{}", key_id))
            .with_data("secret_key", Uuid::new_v4().simple().to_string());
        secret.request_id = Uuid::new_v4().to_string();

        if self.credential_type == CredentialType::Sts {
            secret = secret.with_data("security_token", format!("FQoGZXIvYXdz{}", lease));
        }
        secret
    }
}

/// Mock store for testing.
///
/// # Example
///
/// ```
/// use vaultcreds::backends::mock::MockStore;
/// use vaultcreds::{SecretStore, VaultCredsError};
///
/// #[tokio::main]
/// async fn main() -> vaultcreds::Result<()> {
///     let mut store = MockStore::new();
///     store.set_dynamic_role("aws", "deploy", vaultcreds::CredentialType::Creds, 3600).await;
///
///     let first = store.read("aws/creds/deploy").await?.unwrap();
///     let second = store.read("aws/creds/deploy").await?.unwrap();
///     assert_ne!(first.lease_id, second.lease_id);
///
///     // Test error conditions
///     store.fail_reads_with(|| VaultCredsError::Transport("connection refused".to_string()));
///     assert!(store.read("aws/creds/deploy").await.is_err());
///     assert_eq!(store.read_count().await, 3);
///
///     Ok(())
/// }
/// ```
pub struct MockStore {
    secrets: Arc<RwLock<HashMap<String, Secret>>>,
    dynamic: Arc<RwLock<HashMap<String, DynamicRole>>>,
    pending: Arc<RwLock<HashMap<String, usize>>>,
    reads: Arc<RwLock<Vec<String>>>,

    /// Builds the error returned from `read()`
    pub read_error: Option<fn() -> VaultCredsError>,
}

impl MockStore {
    /// Creates a new mock store with no secrets.
    pub fn new() -> Self {
        Self {
            secrets: Arc::new(RwLock::new(HashMap::new())),
            dynamic: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(RwLock::new(HashMap::new())),
            reads: Arc::new(RwLock::new(Vec::new())),
            read_error: None,
        }
    }

    /// Makes every read fail with the error `make_error` builds.
    pub fn fail_reads_with(&mut self, make_error: fn() -> VaultCredsError) {
        self.read_error = Some(make_error);
    }

    /// Serves `secret` for every read of `path`.
    pub async fn set_secret(&self, path: impl Into<String>, secret: Secret) {
        let mut secrets = self.secrets.write().await;
        secrets.insert(path.into(), secret);
    }

    /// Registers a role that mints a new lease and credentials on each read.
    ///
    /// The role is served at `backend/type/role`.
    pub async fn set_dynamic_role(
        &self,
        backend: &str,
        role: &str,
        credential_type: CredentialType,
        lease_duration: i64,
    ) {
        let path = format!("{}/{}/{}", backend, credential_type, role);
        let mut dynamic = self.dynamic.write().await;
        dynamic.insert(
            path,
            DynamicRole {
                credential_type,
                lease_duration,
                renewable: credential_type == CredentialType::Creds,
            },
        );
    }

    /// Makes the next `reads` reads of `path` come back empty, as if the
    /// credentials were still being provisioned.
    pub async fn set_pending(&self, path: impl Into<String>, reads: usize) {
        let mut pending = self.pending.write().await;
        pending.insert(path.into(), reads);
    }

    /// Paths read so far, in order.
    pub async fn reads(&self) -> Vec<String> {
        self.reads.read().await.clone()
    }

    /// Number of reads attempted so far.
    pub async fn read_count(&self) -> usize {
        self.reads.read().await.len()
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn read(&self, path: &str) -> Result<Option<Secret>> {
        self.reads.write().await.push(path.to_string());

        if let Some(make_error) = self.read_error {
            return Err(make_error());
        }

        {
            let mut pending = self.pending.write().await;
            if let Some(remaining) = pending.get_mut(path) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Ok(None);
                }
            }
        }

        if let Some(role) = self.dynamic.read().await.get(path) {
            return Ok(Some(role.issue(path)));
        }

        let secrets = self.secrets.read().await;
        Ok(secrets.get(path).cloned())
    }
}

/// Registers the mock store with the factory.
pub fn register() {
    crate::factory::register_store("mock", |_cfg| Ok(Arc::new(MockStore::new())));
}
