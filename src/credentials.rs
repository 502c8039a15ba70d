//! Credential fetching and lease projection.
//!
//! [`fetch`] performs exactly one read against a [`SecretStore`] and maps the
//! response into an [`AwsCredentials`] record. [`CredentialFetcher`] wraps the
//! same operation with an optional bounded poll for roles whose credentials
//! are provisioned asynchronously.
//!
//! Reads are not idempotent: every read against a dynamic role issues a new
//! lease with new credentials.

use crate::{AwsSecretRequest, Result, Secret, SecretStore, VaultCredsError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// AWS credentials and the lease they were issued under.
///
/// Built fresh from one successful read and never cached.
#[derive(Clone, PartialEq, Serialize)]
pub struct AwsCredentials {
    /// Lease identifier, used as the record id
    pub id: String,
    /// AWS access key ID (`creds` and `sts`)
    pub access_key: Option<String>,
    /// AWS secret access key (`creds` and `sts`)
    pub secret_key: Option<String>,
    /// AWS session token (`sts` only)
    pub security_token: Option<String>,
    /// Lease identifier assigned by Vault
    pub lease_id: String,
    /// Lease duration in seconds, relative to `lease_start_time`
    pub lease_duration: i64,
    /// When this process read the lease, by the local clock
    pub lease_start_time: DateTime<Utc>,
    /// Whether the lease can be extended through renewal
    pub lease_renewable: bool,
}

impl AwsCredentials {
    /// Projects a store response into a credentials record.
    ///
    /// `read_at` becomes `lease_start_time`; nothing in the response is used
    /// for it.
    pub fn from_secret(secret: &Secret, read_at: DateTime<Utc>) -> Self {
        Self {
            id: secret.lease_id.clone(),
            access_key: secret.data_string("access_key"),
            secret_key: secret.data_string("secret_key"),
            security_token: secret.data_string("security_token"),
            lease_id: secret.lease_id.clone(),
            lease_duration: secret.lease_duration,
            lease_start_time: read_at,
            lease_renewable: secret.renewable,
        }
    }

    /// Returns when the lease runs out, by the local clock.
    ///
    /// `None` when the reported duration puts the expiry outside the range
    /// a `DateTime` can hold.
    pub fn lease_expires_at(&self) -> Option<DateTime<Utc>> {
        TimeDelta::try_seconds(self.lease_duration)
            .and_then(|d| self.lease_start_time.checked_add_signed(d))
    }

    /// Returns true if the lease has run out at `now`.
    ///
    /// A lease whose expiry cannot be represented never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.lease_expires_at().is_some_and(|expires| now >= expires)
    }
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("AwsCredentials")
            .field("id", &self.id)
            .field("access_key", &self.access_key)
            .field("secret_key", &redact(&self.secret_key))
            .field("security_token", &redact(&self.security_token))
            .field("lease_id", &self.lease_id)
            .field("lease_duration", &self.lease_duration)
            .field("lease_start_time", &self.lease_start_time)
            .field("lease_renewable", &self.lease_renewable)
            .finish()
    }
}

/// Polling behavior for reads that come back empty.
///
/// The default makes a single attempt, so an empty response fails
/// immediately with [`VaultCredsError::NotFound`]. Store errors are never
/// retried regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Total reads to attempt (values below 1 are treated as 1)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl PollConfig {
    /// A single read with no polling.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
        }
    }

    /// Polls up to `max_attempts` reads with doubling delays capped at
    /// `max_backoff`.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultcreds::PollConfig;
    /// use std::time::Duration;
    ///
    /// let poll = PollConfig::bounded(4, Duration::from_secs(1), Duration::from_secs(3));
    /// // 1s + 2s + 3s between the four reads
    /// assert_eq!(poll.worst_case_delay(), Duration::from_secs(6));
    /// ```
    pub fn bounded(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Total time spent sleeping when every attempt comes back empty.
    ///
    /// The call's worst-case latency is this plus `max_attempts` times the
    /// per-request timeout.
    pub fn worst_case_delay(&self) -> Duration {
        (0..self.attempts() - 1)
            .map(|retry| self.delay_for(retry))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Reads credentials for `request` with exactly one store read.
///
/// # Errors
///
/// - [`VaultCredsError::StoreRead`]: the store failed; the cause is kept as
///   the error source
/// - [`VaultCredsError::NotFound`]: the store had nothing at the path
///
/// # Example
///
/// ```
/// use vaultcreds::backends::mock::MockStore;
/// use vaultcreds::{credentials, AwsSecretRequest, CredentialType, Secret};
///
/// #[tokio::main]
/// async fn main() -> vaultcreds::Result<()> {
///     let store = MockStore::new();
///     store
///         .set_secret(
///             "aws/creds/deploy",
///             Secret::leased("aws/creds/deploy/abc", 3600, true)
///                 .with_data("access_key", "AKIAEXAMPLE")
///                 .with_data("secret_key", "wJalrXUtnFEMI"),
///         )
///         .await;
///
///     let request = AwsSecretRequest::new("aws", "deploy")?;
///     let creds = credentials::fetch(&store, &request).await?;
///     assert_eq!(creds.lease_id, "aws/creds/deploy/abc");
///     assert_eq!(creds.access_key.as_deref(), Some("AKIAEXAMPLE"));
///     Ok(())
/// }
/// ```
pub async fn fetch(store: &dyn SecretStore, request: &AwsSecretRequest) -> Result<AwsCredentials> {
    let path = request.path();
    match read_once(store, &path).await? {
        Some((secret, read_at)) => Ok(project(&path, &secret, read_at)),
        None => Err(VaultCredsError::NotFound { path }),
    }
}

/// Validates raw parameters, then reads credentials.
///
/// A bad `credential_type` is rejected before the store is touched.
pub async fn fetch_raw(
    store: &dyn SecretStore,
    backend: &str,
    role: &str,
    credential_type: Option<&str>,
) -> Result<AwsCredentials> {
    let request = AwsSecretRequest::parse(backend, role, credential_type)?;
    fetch(store, &request).await
}

async fn read_once(
    store: &dyn SecretStore,
    path: &str,
) -> Result<Option<(Secret, DateTime<Utc>)>> {
    debug!(store = store.name(), path, "reading credentials from Vault");
    let read_at = Utc::now();
    let secret = store
        .read(path)
        .await
        .map_err(|e| VaultCredsError::store_read(path, e))?;
    debug!(path, found = secret.is_some(), "read credentials from Vault");

    Ok(secret.map(|s| (s, read_at)))
}

fn project(path: &str, secret: &Secret, read_at: DateTime<Utc>) -> AwsCredentials {
    for warning in secret.warnings() {
        warn!(path, warning = %warning, "Vault returned a warning");
    }
    if secret.lease_id.is_empty() {
        warn!(path, "Vault response has no lease id");
    }
    AwsCredentials::from_secret(secret, read_at)
}

/// Credential fetcher bound to a store, with optional polling.
///
/// Cloning is cheap; clones share the same store handle.
#[derive(Clone)]
pub struct CredentialFetcher {
    store: Arc<dyn SecretStore>,
    poll: PollConfig,
}

impl CredentialFetcher {
    /// Creates a fetcher that reads once per call.
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            poll: PollConfig::default(),
        }
    }

    /// Sets the polling behavior for empty responses.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn poll(&self) -> &PollConfig {
        &self.poll
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// Reads credentials for `request`.
    ///
    /// With the default [`PollConfig`] this is identical to [`fetch`]. With
    /// polling enabled, empty responses are retried after a backoff delay
    /// until `max_attempts` reads have been made.
    pub async fn fetch(&self, request: &AwsSecretRequest) -> Result<AwsCredentials> {
        let path = request.path();
        let attempts = self.poll.attempts();

        for attempt in 1..=attempts {
            if let Some((secret, read_at)) = read_once(&*self.store, &path).await? {
                return Ok(project(&path, &secret, read_at));
            }
            if attempt < attempts {
                let delay = self.poll.delay_for(attempt - 1);
                debug!(path = %path, attempt, ?delay, "no credentials yet, polling");
                tokio::time::sleep(delay).await;
            }
        }

        Err(VaultCredsError::NotFound { path })
    }

    /// Validates raw parameters, then reads credentials.
    pub async fn fetch_raw(
        &self,
        backend: &str,
        role: &str,
        credential_type: Option<&str>,
    ) -> Result<AwsCredentials> {
        let request = AwsSecretRequest::parse(backend, role, credential_type)?;
        self.fetch(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_from_secret_creds() {
        let secret = Secret::leased("aws/creds/test/xyz", 3600, false)
            .with_data("access_key", "AKIAEXAMPLE")
            .with_data("secret_key", "abc");

        let creds = AwsCredentials::from_secret(&secret, start());
        assert_eq!(creds.id, "aws/creds/test/xyz");
        assert_eq!(creds.lease_id, creds.id);
        assert_eq!(creds.access_key.as_deref(), Some("AKIAEXAMPLE"));
        assert_eq!(creds.secret_key.as_deref(), Some("abc"));
        assert_eq!(creds.security_token, None);
        assert_eq!(creds.lease_duration, 3600);
        assert!(!creds.lease_renewable);
        assert_eq!(creds.lease_start_time, start());
    }

    #[test]
    fn test_from_secret_sts_only_token() {
        let secret = Secret::leased("aws/sts/test/1", 900, false)
            .with_data("security_token", "FQoGZXIvYXdzEXAMPLE");

        let creds = AwsCredentials::from_secret(&secret, start());
        assert_eq!(creds.access_key, None);
        assert_eq!(creds.secret_key, None);
        assert_eq!(creds.security_token.as_deref(), Some("FQoGZXIvYXdzEXAMPLE"));
    }

    #[test]
    fn test_lease_expiry() {
        let secret = Secret::leased("aws/creds/test/xyz", 60, true);
        let creds = AwsCredentials::from_secret(&secret, start());

        assert_eq!(creds.lease_expires_at(), Some(start() + TimeDelta::seconds(60)));
        assert!(!creds.is_expired_at(start() + TimeDelta::seconds(59)));
        assert!(creds.is_expired_at(start() + TimeDelta::seconds(60)));
    }

    #[test]
    fn test_lease_expiry_out_of_range() {
        let body = r#"{"lease_id": "aws/creds/test/big", "lease_duration": 9000000000000}"#;
        let secret: Secret = serde_json::from_str(body).unwrap();
        let creds = AwsCredentials::from_secret(&secret, start());

        assert_eq!(creds.lease_expires_at(), None);
        assert!(!creds.is_expired_at(start() + TimeDelta::days(365)));

        let secret = Secret::leased("aws/creds/test/max", i64::MAX, false);
        let creds = AwsCredentials::from_secret(&secret, start());
        assert_eq!(creds.lease_expires_at(), None);
        assert!(!creds.is_expired_at(start()));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let secret = Secret::leased("aws/sts/test/1", 900, false)
            .with_data("access_key", "AKIAEXAMPLE")
            .with_data("secret_key", "super-secret")
            .with_data("security_token", "token-value");
        let creds = AwsCredentials::from_secret(&secret, start());

        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIAEXAMPLE"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("token-value"));
    }

    #[test]
    fn test_poll_disabled_by_default() {
        let poll = PollConfig::default();
        assert_eq!(poll.max_attempts, 1);
        assert_eq!(poll.worst_case_delay(), Duration::ZERO);
    }

    #[test]
    fn test_poll_backoff_is_capped() {
        let poll = PollConfig::bounded(5, Duration::from_millis(100), Duration::from_millis(300));
        assert_eq!(poll.delay_for(0), Duration::from_millis(100));
        assert_eq!(poll.delay_for(1), Duration::from_millis(200));
        assert_eq!(poll.delay_for(2), Duration::from_millis(300));
        assert_eq!(poll.delay_for(10), Duration::from_millis(300));
        assert_eq!(poll.worst_case_delay(), Duration::from_millis(900));
    }

    #[test]
    fn test_poll_zero_attempts_means_one() {
        let poll = PollConfig::bounded(0, Duration::from_secs(1), Duration::from_secs(1));
        assert_eq!(poll.worst_case_delay(), Duration::ZERO);
    }
}
