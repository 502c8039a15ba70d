//! Error types for credential reads.

use thiserror::Error;

/// Result type alias using [`VaultCredsError`].
pub type Result<T> = std::result::Result<T, VaultCredsError>;

/// Errors that can occur while reading credentials.
///
/// Every error is terminal for the read that produced it. Nothing here is
/// retried internally; callers decide whether to issue the whole read again.
#[derive(Debug, Error)]
pub enum VaultCredsError {
    /// Input was rejected before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The store answered, but had nothing at the requested path.
    #[error("no role found at {path:?}; are you sure you're using the right backend and role?")]
    NotFound {
        /// The lookup path that came back empty
        path: String,
    },

    /// Reading from the store failed.
    ///
    /// Wraps the underlying failure with the path that was being read.
    #[error("error reading from Vault at {path:?}: {source}")]
    StoreRead {
        /// Lookup path
        path: String,
        /// Underlying error
        #[source]
        source: Box<VaultCredsError>,
    },

    /// The store could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP client error.
    #[cfg(feature = "http")]
    #[error("HTTP error: {}", error_chain(.0))]
    Http(#[from] reqwest::Error),

    /// Vault answered with a non-success status.
    #[error("Vault returned status {status}: {}", .errors.join("; "))]
    Api {
        /// HTTP status code
        status: u16,
        /// Error messages from the response body
        errors: Vec<String>,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Renders an error and each of its sources, joined with `": "`.
///
/// reqwest keeps the transport cause (for example "Connection refused") in
/// `source()` only.
#[cfg_attr(not(feature = "http"), allow(dead_code))]
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

impl VaultCredsError {
    /// Wraps a store failure with the path that was being read.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultcreds::VaultCredsError;
    ///
    /// let err = VaultCredsError::Transport("connection refused".to_string());
    /// let wrapped = VaultCredsError::store_read("aws/creds/deploy", err);
    ///
    /// assert_eq!(
    ///     wrapped.to_string(),
    ///     "error reading from Vault at \"aws/creds/deploy\": transport error: connection refused"
    /// );
    /// ```
    pub fn store_read(path: impl Into<String>, err: VaultCredsError) -> Self {
        Self::StoreRead {
            path: path.into(),
            source: Box::new(err),
        }
    }

    /// Returns true for input errors raised before any request.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true when the store had nothing at the requested path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for failures reaching or talking to the store.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::StoreRead { .. } | Self::Transport(_) | Self::Api { .. } => true,
            #[cfg(feature = "http")]
            Self::Http(_) => true,
            _ => false,
        }
    }
}
