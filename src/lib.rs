//! Vaultcreds - read dynamic AWS credentials from Vault.
//!
//! Vaultcreds reads credentials from a Vault AWS secrets engine and returns
//! them together with their lease metadata as one flat record. It is the
//! engine behind a `vault_aws_secret` style data source: one read in, one
//! record out, nothing cached.
//!
//! # Features
//!
//! - **Single Read**: One request per call, no hidden retries
//! - **Lease Metadata**: Lease id, duration, renewability and local read time
//! - **Injected Store**: Any [`SecretStore`] can back a read, including the in-memory mock
//! - **Optional Polling**: Bounded polling for asynchronously provisioned roles
//! - **Error Context**: Validation, not-found and transport errors kept distinct
//!
//! # Quick Start
//!
//! ```no_run
//! use vaultcreds::{credentials, factory, AwsSecretRequest, ClientConfig, CredentialType};
//!
//! #[tokio::main]
//! async fn main() -> vaultcreds::Result<()> {
//!     // VAULT_ADDR, VAULT_TOKEN, ...
//!     let config = ClientConfig::from_env()?;
//!     let store = factory::new_store(&config)?;
//!
//!     let request = AwsSecretRequest::new("aws", "deploy")?
//!         .with_type(CredentialType::Sts);
//!     let creds = credentials::fetch(&*store, &request).await?;
//!
//!     println!("lease {} valid for {}s", creds.lease_id, creds.lease_duration);
//!     Ok(())
//! }
//! ```
//!
//! # Stores
//!
//! | Store | Feature Flag | Notes |
//! |-------|-------------|-------|
//! | HTTP | `http` (default) | Vault HTTP API via reqwest |
//! | Mock | `mock` (default) | In-memory testing store |
//!
//! # Lookup Paths
//!
//! Credentials are read from `{backend}/{type}/{role}`, where `type` is
//! `creds` or `sts`. Values are joined verbatim.

pub mod backends;
pub mod config;
pub mod credentials;
pub mod data_source;
pub mod error;
pub mod factory;
pub mod request;
pub mod secret;
pub mod store;
pub mod validation;

pub use config::{ClientConfig, StoreType};
pub use credentials::{AwsCredentials, CredentialFetcher, PollConfig};
pub use error::{Result, VaultCredsError};
pub use request::{AwsSecretRequest, CredentialType};
pub use secret::Secret;
pub use store::SecretStore;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the vaultcreds library.
///
/// This registers all compiled stores with the factory. It's called
/// automatically by [`factory::new_store`], but can be called explicitly
/// (it's idempotent).
pub fn init() {
    INIT.call_once(backends::register_all);
}
