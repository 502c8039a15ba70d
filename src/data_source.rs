//! Data source surface for infrastructure-as-code hosts.
//!
//! A host framework decides when to read; this module only exposes the read
//! itself. [`DataSource::read`] takes the user's configuration block as JSON
//! and returns the state to persist, keyed by lease id. Every read is fresh,
//! so hosts should expect a changed plan on every cycle.

use crate::credentials::{AwsCredentials, CredentialFetcher, PollConfig};
use crate::{factory, AwsSecretRequest, ClientConfig, Result, SecretStore, VaultCredsError};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Name under which the AWS credentials data source is registered.
pub const AWS_SECRET_DATA_SOURCE: &str = "vault_aws_secret";

/// Attribute type in a data source schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Int,
    Bool,
}

/// How an attribute is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Must be set by the user
    Required,
    /// May be set by the user; has a default
    Optional,
    /// Set by the read
    Computed,
}

/// One attribute of a data source schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub mode: FieldMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    pub description: &'static str,
}

const fn field(
    name: &'static str,
    kind: FieldKind,
    mode: FieldMode,
    description: &'static str,
) -> FieldSchema {
    FieldSchema {
        name,
        kind,
        mode,
        default: None,
        description,
    }
}

static AWS_SECRET_SCHEMA: [FieldSchema; 10] = [
    field("backend", FieldKind::String, FieldMode::Required, "AWS Secret Backend to read credentials from."),
    field("role", FieldKind::String, FieldMode::Required, "AWS Secret Role to read credentials from."),
    FieldSchema {
        name: "type",
        kind: FieldKind::String,
        mode: FieldMode::Optional,
        default: Some("creds"),
        description: "Type of credentials to read. Must be either 'creds' for Access Key and Secret Key, or 'sts' for STS.",
    },
    field("access_key", FieldKind::String, FieldMode::Computed, "AWS access key ID read from Vault."),
    field("secret_key", FieldKind::String, FieldMode::Computed, "AWS secret key read from Vault."),
    field("security_token", FieldKind::String, FieldMode::Computed, "AWS security token read from Vault. (Only returned for STS.)"),
    field("lease_id", FieldKind::String, FieldMode::Computed, "Lease identifier assigned by vault."),
    field("lease_duration", FieldKind::Int, FieldMode::Computed, "Lease duration in seconds relative to the time in lease_start_time."),
    field("lease_start_time", FieldKind::String, FieldMode::Computed, "Time at which the lease was read, using the clock of the system where the read ran."),
    field("lease_renewable", FieldKind::Bool, FieldMode::Computed, "True if the duration of this lease can be extended through renewal."),
];

/// State persisted by the host after a read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceState {
    /// Identity of the state entry (the lease id)
    pub id: String,
    /// Input and computed attributes
    pub attributes: Map<String, Value>,
}

/// A read-only data source invoked by a host framework.
///
/// The host validates configuration against [`schema`](DataSource::schema),
/// calls [`read`](DataSource::read) whenever it needs fresh values, and owns
/// whatever it does with the returned state.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the data source name (e.g., "vault_aws_secret").
    fn name(&self) -> &str;

    /// Returns the attribute schema.
    fn schema(&self) -> &[FieldSchema];

    /// Reads the data source for one configuration block.
    ///
    /// # Errors
    ///
    /// Any error is fatal to this read; no partial state is returned.
    async fn read(&self, params: &Value) -> Result<ResourceState>;
}

fn default_type() -> String {
    "creds".to_string()
}

/// Configuration block of the AWS credentials data source.
///
/// ```
/// use vaultcreds::data_source::AwsSecretParams;
/// use serde_json::json;
///
/// let params = AwsSecretParams::from_value(&json!({"backend": "aws", "role": "deploy"}))?;
/// assert_eq!(params.credential_type, "creds");
/// assert_eq!(params.to_request()?.path(), "aws/creds/deploy");
/// # Ok::<(), vaultcreds::VaultCredsError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsSecretParams {
    /// Mount path of the AWS secrets engine
    pub backend: String,
    /// Role to read credentials from
    pub role: String,
    /// "creds" or "sts"
    #[serde(rename = "type", default = "default_type")]
    pub credential_type: String,
}

impl AwsSecretParams {
    /// Creates parameters for a `creds` read.
    pub fn new(backend: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            role: role.into(),
            credential_type: default_type(),
        }
    }

    /// Sets the raw credential type.
    pub fn with_type(mut self, credential_type: impl Into<String>) -> Self {
        self.credential_type = credential_type.into();
        self
    }

    /// Decodes a configuration block.
    ///
    /// # Errors
    ///
    /// Returns [`VaultCredsError::Validation`] for missing required fields,
    /// wrongly typed values or unknown attributes.
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| VaultCredsError::Validation(e.to_string()))
    }

    /// Validates the parameters into a request.
    pub fn to_request(&self) -> Result<AwsSecretRequest> {
        AwsSecretRequest::parse(&self.backend, &self.role, Some(&self.credential_type))
    }
}

impl AwsCredentials {
    /// Projects the record into host state keyed by lease id.
    ///
    /// Absent credentials become `null`; `lease_start_time` is RFC 3339 with
    /// second precision.
    pub fn to_state(&self, request: &AwsSecretRequest) -> ResourceState {
        let attributes = match json!({
            "backend": request.backend(),
            "role": request.role(),
            "type": request.credential_type().as_str(),
            "access_key": self.access_key,
            "secret_key": self.secret_key,
            "security_token": self.security_token,
            "lease_id": self.lease_id,
            "lease_duration": self.lease_duration,
            "lease_start_time": self.lease_start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            "lease_renewable": self.lease_renewable,
        }) {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        ResourceState {
            id: self.lease_id.clone(),
            attributes,
        }
    }
}

/// The `vault_aws_secret` data source.
///
/// # Example
///
/// ```
/// use vaultcreds::backends::mock::MockStore;
/// use vaultcreds::data_source::{AwsSecretDataSource, DataSource};
/// use vaultcreds::CredentialType;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> vaultcreds::Result<()> {
///     let store = MockStore::new();
///     store.set_dynamic_role("aws", "deploy", CredentialType::Creds, 3600).await;
///
///     let source = AwsSecretDataSource::new(Arc::new(store));
///     let state = source.read(&json!({"backend": "aws", "role": "deploy"})).await?;
///     assert!(state.id.starts_with("aws/creds/deploy/"));
///     assert_eq!(state.attributes["lease_duration"], 3600);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct AwsSecretDataSource {
    fetcher: CredentialFetcher,
}

impl AwsSecretDataSource {
    /// Creates the data source over an existing store handle.
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            fetcher: CredentialFetcher::new(store),
        }
    }

    /// Builds the store described by `config` and wraps it.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let store = factory::new_store(config)?;
        Ok(Self::new(store).with_poll(config.poll))
    }

    /// Sets the polling behavior for empty responses.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.fetcher = self.fetcher.with_poll(poll);
        self
    }

    /// Reads credentials for typed parameters.
    ///
    /// The credential type is validated before the store is called.
    pub async fn read_credentials(&self, params: &AwsSecretParams) -> Result<AwsCredentials> {
        let request = params.to_request()?;
        self.fetcher.fetch(&request).await
    }
}

#[async_trait]
impl DataSource for AwsSecretDataSource {
    fn name(&self) -> &str {
        AWS_SECRET_DATA_SOURCE
    }

    fn schema(&self) -> &[FieldSchema] {
        &AWS_SECRET_SCHEMA
    }

    async fn read(&self, params: &Value) -> Result<ResourceState> {
        let request = AwsSecretParams::from_value(params)?.to_request()?;
        let creds = self.fetcher.fetch(&request).await?;
        Ok(creds.to_state(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CredentialType, Secret};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_params_defaults() {
        let params = AwsSecretParams::from_value(&json!({"backend": "aws", "role": "test"})).unwrap();
        assert_eq!(params, AwsSecretParams::new("aws", "test"));
    }

    #[test]
    fn test_params_missing_required() {
        let err = AwsSecretParams::from_value(&json!({"backend": "aws"})).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("role"));
    }

    #[test]
    fn test_params_unknown_field() {
        let err = AwsSecretParams::from_value(&json!({
            "backend": "aws",
            "role": "test",
            "ttl": "1h"
        }))
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_params_bad_type() {
        let params = AwsSecretParams::new("aws", "test").with_type("Creds");
        assert!(params.to_request().unwrap_err().is_validation());
    }

    #[test]
    fn test_schema_shape() {
        let names: Vec<_> = AWS_SECRET_SCHEMA.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            [
                "backend",
                "role",
                "type",
                "access_key",
                "secret_key",
                "security_token",
                "lease_id",
                "lease_duration",
                "lease_start_time",
                "lease_renewable"
            ]
        );

        let type_field = &AWS_SECRET_SCHEMA[2];
        assert_eq!(type_field.mode, FieldMode::Optional);
        assert_eq!(type_field.default, Some("creds"));
        assert!(AWS_SECRET_SCHEMA[3..].iter().all(|f| f.mode == FieldMode::Computed));
    }

    #[test]
    fn test_to_state() {
        let secret = Secret::leased("aws/sts/test/abc", 900, false)
            .with_data("security_token", "FQoGZXIvYXdzEXAMPLE");
        let read_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let creds = AwsCredentials::from_secret(&secret, read_at);
        let request = AwsSecretRequest::new("aws", "test")
            .unwrap()
            .with_type(CredentialType::Sts);

        let state = creds.to_state(&request);
        assert_eq!(state.id, "aws/sts/test/abc");
        assert_eq!(state.attributes["type"], "sts");
        assert_eq!(state.attributes["lease_id"], "aws/sts/test/abc");
        assert_eq!(state.attributes["access_key"], Value::Null);
        assert_eq!(state.attributes["security_token"], "FQoGZXIvYXdzEXAMPLE");
        assert_eq!(state.attributes["lease_start_time"], "2024-05-01T12:00:00Z");
        assert_eq!(state.attributes["lease_renewable"], false);
    }
}
