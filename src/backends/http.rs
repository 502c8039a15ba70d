//! Vault HTTP API store.

use crate::{ClientConfig, Result, Secret, SecretStore, VaultCredsError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Error body returned by Vault on failure.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

/// Store backed by the Vault HTTP API.
///
/// Reads are `GET {address}/v1/{path}` with the configured token and
/// namespace headers. The only timeout is the one set on the client.
pub struct HttpStore {
    client: Client,
    address: String,
    token: Option<String>,
    namespace: Option<String>,
}

impl HttpStore {
    /// Creates a new HTTP store from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VaultCredsError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.skip_tls_verify)
            .build()?;

        Ok(Self {
            client,
            address: config.address.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            namespace: config.namespace.clone(),
        })
    }

    /// Builds the request URL for a logical path.
    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl SecretStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn read(&self, path: &str) -> Result<Option<Secret>> {
        let url = self.url(path);

        let mut request = self.client.get(&url).header("X-Vault-Request", "true");
        if let Some(ref token) = self.token {
            request = request.header("X-Vault-Token", token);
        }
        if let Some(ref namespace) = self.namespace {
            request = request.header("X-Vault-Namespace", namespace);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%url, status = status.as_u16(), "Vault responded");

        match status {
            StatusCode::NO_CONTENT => Ok(None),
            // A 404 may still carry data or warnings; anything else is absence
            StatusCode::NOT_FOUND => match serde_json::from_slice::<Secret>(&body) {
                Ok(secret)
                    if secret.data.as_ref().is_some_and(|d| !d.is_empty())
                        || !secret.warnings().is_empty() =>
                {
                    Ok(Some(secret))
                }
                _ => Ok(None),
            },
            s if s.is_success() => {
                if body.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                Ok(Some(serde_json::from_slice(&body)?))
            }
            s => {
                let mut errors = serde_json::from_slice::<ErrorBody>(&body)
                    .unwrap_or_default()
                    .errors;
                if errors.is_empty() {
                    errors.push(s.canonical_reason().unwrap_or("unknown error").to_string());
                }
                Err(VaultCredsError::Api {
                    status: s.as_u16(),
                    errors,
                })
            }
        }
    }
}

/// Registers the HTTP store with the factory.
pub fn register() {
    crate::factory::register_store("http", |cfg| Ok(Arc::new(HttpStore::new(cfg)?)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreType;

    #[test]
    fn test_url() {
        let config = ClientConfig::new(StoreType::Http).with_address("http://127.0.0.1:8200/");
        let store = HttpStore::new(&config).unwrap();

        assert_eq!(store.url("aws/creds/test"), "http://127.0.0.1:8200/v1/aws/creds/test");
        assert_eq!(store.url("/aws/sts/test"), "http://127.0.0.1:8200/v1/aws/sts/test");
    }

    #[test]
    fn test_url_keeps_nested_mounts() {
        let config = ClientConfig::new(StoreType::Http).with_address("https://vault.example.com");
        let store = HttpStore::new(&config).unwrap();

        assert_eq!(
            store.url("teams/aws/creds/ci"),
            "https://vault.example.com/v1/teams/aws/creds/ci"
        );
    }
}
