//! Secret data returned by a store read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A secret as returned by Vault's logical read API.
///
/// Every field is optional on the wire. The shape of `data` depends on the
/// role being read, so it is kept as a free-form map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Secret {
    /// Request identifier assigned by the server
    #[serde(default)]
    pub request_id: String,

    /// Lease identifier for the issued credentials
    #[serde(default)]
    pub lease_id: String,

    /// Lease TTL in seconds at issuance
    #[serde(default)]
    pub lease_duration: i64,

    /// Whether the lease may be extended
    #[serde(default)]
    pub renewable: bool,

    /// Payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, Value>>,

    /// Server-side warnings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl Secret {
    /// Creates a leased secret with the given payload.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultcreds::Secret;
    ///
    /// let secret = Secret::leased("aws/creds/test/abc", 3600, true)
    ///     .with_data("access_key", "AKIAEXAMPLE");
    /// assert_eq!(secret.data_string("access_key").as_deref(), Some("AKIAEXAMPLE"));
    /// assert_eq!(secret.data_string("security_token"), None);
    /// ```
    pub fn leased(lease_id: impl Into<String>, lease_duration: i64, renewable: bool) -> Self {
        Self {
            lease_id: lease_id.into(),
            lease_duration,
            renewable,
            ..Default::default()
        }
    }

    /// Adds a key to the payload.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Reads a payload key as a string.
    ///
    /// Missing and null keys give `None`. Strings are returned as-is; other
    /// values are rendered as JSON text.
    pub fn data_string(&self, key: &str) -> Option<String> {
        match self.data.as_ref()?.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Server-side warnings, if any.
    pub fn warnings(&self) -> &[String] {
        self.warnings.as_deref().unwrap_or_default()
    }
}
