//! Secret store trait definition.
//!
//! This module defines the [`SecretStore`] trait, the seam between the
//! credential fetcher and whatever client actually talks to Vault. The
//! store is injected into every read, so tests can substitute an in-memory
//! implementation.

use crate::{Result, Secret};
use async_trait::async_trait;

/// SecretStore is a pre-authenticated, read-only handle to a secret store.
///
/// Implementations own transport, authentication and timeouts. All
/// implementations must be `Send + Sync` so one handle can be shared by
/// concurrent reads for different roles.
///
/// # Implementations
///
/// - **HTTP**: [`HttpStore`](crate::backends::http::HttpStore) against the Vault API
/// - **Testing**: [`MockStore`](crate::backends::mock::MockStore) with fixtures and error injection
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the store name (e.g., "http", "mock").
    fn name(&self) -> &str;

    /// Reads the secret at `path`.
    ///
    /// Returns `Ok(None)` when the store has nothing at that path.
    ///
    /// Dropping the returned future cancels the read.
    ///
    /// # Errors
    ///
    /// Returns an error if the store could not be reached or refused the
    /// request (network failure, bad token, permission denied).
    async fn read(&self, path: &str) -> Result<Option<Secret>>;
}
