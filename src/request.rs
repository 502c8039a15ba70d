//! Request parameters and lookup path composition.

use crate::validation::validate_segment;
use crate::{Result, VaultCredsError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of AWS credentials to issue.
///
/// The wire names are case-sensitive: `"creds"` and `"sts"` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    /// IAM user access key and secret key
    #[default]
    Creds,
    /// Temporary STS credentials including a security token
    Sts,
}

impl CredentialType {
    /// Returns the path segment for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creds => "creds",
            Self::Sts => "sts",
        }
    }
}

impl std::fmt::Display for CredentialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialType {
    type Err = VaultCredsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "creds" => Ok(Self::Creds),
            "sts" => Ok(Self::Sts),
            other => Err(VaultCredsError::Validation(format!(
                "type must be creds or sts, got {:?}",
                other
            ))),
        }
    }
}

/// A validated request for credentials from one role.
///
/// # Example
///
/// ```
/// use vaultcreds::{AwsSecretRequest, CredentialType};
///
/// let request = AwsSecretRequest::new("aws", "deploy")?
///     .with_type(CredentialType::Sts);
/// assert_eq!(request.path(), "aws/sts/deploy");
/// # Ok::<(), vaultcreds::VaultCredsError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSecretRequest {
    backend: String,
    role: String,
    credential_type: CredentialType,
}

impl AwsSecretRequest {
    /// Creates a `creds` request for `role` under the `backend` mount.
    ///
    /// # Errors
    ///
    /// Returns [`VaultCredsError::Validation`] if either value is empty or
    /// contains null bytes or control characters.
    pub fn new(backend: impl Into<String>, role: impl Into<String>) -> Result<Self> {
        let backend = backend.into();
        let role = role.into();
        validate_segment("backend", &backend)?;
        validate_segment("role", &role)?;

        Ok(Self {
            backend,
            role,
            credential_type: CredentialType::default(),
        })
    }

    /// Builds a request from raw strings, as supplied by a configuration.
    ///
    /// `credential_type` defaults to `creds` when `None`.
    pub fn parse(backend: &str, role: &str, credential_type: Option<&str>) -> Result<Self> {
        let credential_type = match credential_type {
            Some(raw) => raw.parse()?,
            None => CredentialType::default(),
        };
        Ok(Self::new(backend, role)?.with_type(credential_type))
    }

    /// Sets the credential type.
    pub fn with_type(mut self, credential_type: CredentialType) -> Self {
        self.credential_type = credential_type;
        self
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn credential_type(&self) -> CredentialType {
        self.credential_type
    }

    /// Returns the lookup path `backend/type/role`.
    ///
    /// Values are joined verbatim with no escaping or normalization.
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.backend, self.credential_type, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_composition() {
        let cases = [
            ("aws", "test", CredentialType::Creds, "aws/creds/test"),
            ("aws", "test", CredentialType::Sts, "aws/sts/test"),
            ("aws-prod", "deploy_bot", CredentialType::Creds, "aws-prod/creds/deploy_bot"),
            ("teams/aws", "ci", CredentialType::Sts, "teams/aws/sts/ci"),
        ];

        for (backend, role, kind, expected) in cases {
            let request = AwsSecretRequest::new(backend, role).unwrap().with_type(kind);
            assert_eq!(request.path(), format!("{}/{}/{}", backend, kind, role));
            assert_eq!(request.path(), expected);
        }
    }

    #[test]
    fn test_default_type_is_creds() {
        let request = AwsSecretRequest::new("aws", "test").unwrap();
        assert_eq!(request.credential_type(), CredentialType::Creds);

        let parsed = AwsSecretRequest::parse("aws", "test", None).unwrap();
        assert_eq!(parsed.path(), "aws/creds/test");
    }

    #[test]
    fn test_type_parse_is_case_sensitive() {
        assert_eq!("creds".parse::<CredentialType>().unwrap(), CredentialType::Creds);
        assert_eq!("sts".parse::<CredentialType>().unwrap(), CredentialType::Sts);

        for bad in ["bogus", "", "Creds", "STS", " sts"] {
            let err = bad.parse::<CredentialType>().unwrap_err();
            assert!(err.is_validation(), "expected {:?} to be rejected", bad);
            assert!(err.to_string().contains("type must be creds or sts"));
        }
    }

    #[test]
    fn test_parse_rejects_bad_type() {
        let err = AwsSecretRequest::parse("aws", "test", Some("bogus")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_new_rejects_empty_values() {
        assert!(AwsSecretRequest::new("", "test").unwrap_err().is_validation());
        assert!(AwsSecretRequest::new("aws", "").unwrap_err().is_validation());
    }

    #[test]
    fn test_type_serde_names() {
        assert_eq!(serde_json::to_string(&CredentialType::Sts).unwrap(), "\"sts\"");
        let parsed: CredentialType = serde_json::from_str("\"creds\"").unwrap();
        assert_eq!(parsed, CredentialType::Creds);
        assert!(serde_json::from_str::<CredentialType>("\"Creds\"").is_err());
    }
}
