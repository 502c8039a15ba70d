//! Configuration types for store construction.

use crate::credentials::PollConfig;
use crate::{Result, VaultCredsError};
use std::time::Duration;

/// Default Vault address, matching the Vault CLI.
pub const DEFAULT_ADDRESS: &str = "https://127.0.0.1:8200";

/// Store type identifier.
///
/// Each variant corresponds to a store implementation enabled via Cargo
/// feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreType {
    /// Vault HTTP API (requires the `http` feature)
    Http,
    /// In-memory store (requires the `mock` feature)
    Mock,
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// Configuration for creating a store.
///
/// ```
/// use vaultcreds::{ClientConfig, StoreType};
/// use std::time::Duration;
///
/// let config = ClientConfig::new(StoreType::Http)
///     .with_address("https://vault.internal:8200")
///     .with_token("s.example")
///     .with_namespace("platform")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Store type
    pub store: StoreType,

    /// Vault server address (default: https://127.0.0.1:8200)
    pub address: String,

    /// Vault token sent with every request
    pub token: Option<String>,

    /// Vault Enterprise namespace
    pub namespace: Option<String>,

    /// Per-request timeout (default: 60 seconds)
    pub timeout: Duration,

    /// Skip TLS certificate verification
    pub skip_tls_verify: bool,

    /// Polling behavior for empty responses (default: single read)
    pub poll: PollConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("store", &self.store)
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("namespace", &self.namespace)
            .field("timeout", &self.timeout)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("poll", &self.poll)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store: StoreType::Http,
            address: DEFAULT_ADDRESS.to_string(),
            token: None,
            namespace: None,
            timeout: Duration::from_secs(60),
            skip_tls_verify: false,
            poll: PollConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration for the specified store.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultcreds::{ClientConfig, StoreType};
    ///
    /// let config = ClientConfig::new(StoreType::Mock);
    /// assert_eq!(config.store, StoreType::Mock);
    /// ```
    pub fn new(store: StoreType) -> Self {
        Self {
            store,
            ..Default::default()
        }
    }

    /// Builds an HTTP configuration from the standard Vault environment.
    ///
    /// Reads `VAULT_ADDR`, `VAULT_TOKEN`, `VAULT_NAMESPACE`,
    /// `VAULT_CLIENT_TIMEOUT` (seconds) and `VAULT_SKIP_VERIFY`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultCredsError::Validation`] if `VAULT_CLIENT_TIMEOUT` is
    /// not a whole number of seconds, or if `VAULT_SKIP_VERIFY` is not a
    /// boolean (`1`, `t`, `T`, `true`, `TRUE`, `True` and their `0`/`f`/`false`
    /// counterparts).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new(StoreType::Http);

        if let Some(address) = lookup("VAULT_ADDR").filter(|v| !v.is_empty()) {
            config.address = address;
        }
        config.token = lookup("VAULT_TOKEN").filter(|v| !v.is_empty());
        config.namespace = lookup("VAULT_NAMESPACE").filter(|v| !v.is_empty());

        if let Some(raw) = lookup("VAULT_CLIENT_TIMEOUT").filter(|v| !v.is_empty()) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                VaultCredsError::Validation(format!(
                    "VAULT_CLIENT_TIMEOUT must be a number of seconds, got {:?}",
                    raw
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("VAULT_SKIP_VERIFY").filter(|v| !v.is_empty()) {
            config.skip_tls_verify = parse_bool(&raw).ok_or_else(|| {
                VaultCredsError::Validation(format!(
                    "VAULT_SKIP_VERIFY must be a boolean, got {:?}",
                    raw
                ))
            })?;
        }

        Ok(config)
    }

    /// Sets the Vault server address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the Vault token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the Vault Enterprise namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the per-request timeout.
    ///
    /// This is the only timeout applied to a read; with polling enabled it
    /// bounds each attempt, not the whole call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables TLS certificate verification.
    pub fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    /// Sets the polling behavior for empty responses.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}

/// Parses the boolean spellings the Vault CLI accepts for its environment.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
