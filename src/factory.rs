//! Store factory and registration system.

use crate::{ClientConfig, Result, SecretStore, VaultCredsError};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Factory function type for creating stores.
pub type StoreFactory = fn(&ClientConfig) -> Result<Arc<dyn SecretStore>>;

static STORE_REGISTRY: OnceLock<RwLock<HashMap<String, StoreFactory>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, StoreFactory>> {
    STORE_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Registers a store factory function.
///
/// Called from store modules' `register()` functions during
/// [`crate::init`]. Registering the same name again replaces the factory.
///
/// # Example
///
/// ```no_run
/// use vaultcreds::factory::register_store;
/// use vaultcreds::{ClientConfig, Result, SecretStore};
/// use std::sync::Arc;
///
/// fn my_store_factory(config: &ClientConfig) -> Result<Arc<dyn SecretStore>> {
///     // Create and return store instance
///     # unimplemented!()
/// }
///
/// pub fn register() {
///     register_store("mystore", my_store_factory);
/// }
/// ```
pub fn register_store(store_type: &str, factory: StoreFactory) {
    let mut reg = registry().write().unwrap_or_else(|e| e.into_inner());
    reg.insert(store_type.to_string(), factory);
}

/// Creates a new store from configuration.
///
/// Registers the compiled-in stores on first use, then looks up the factory
/// for `config.store`.
///
/// # Errors
///
/// Returns an error if:
/// - The store type is not registered (missing feature flag)
/// - The store factory fails (for example, the HTTP client cannot be built)
///
/// # Example
///
/// ```
/// use vaultcreds::{factory, ClientConfig, SecretStore, StoreType};
///
/// let store = factory::new_store(&ClientConfig::new(StoreType::Mock))?;
/// assert_eq!(store.name(), "mock");
/// # Ok::<(), vaultcreds::VaultCredsError>(())
/// ```
pub fn new_store(config: &ClientConfig) -> Result<Arc<dyn SecretStore>> {
    crate::init();

    let store_name = config.store.to_string();

    let factory = {
        let reg = registry().read().unwrap_or_else(|e| e.into_inner());
        *reg.get(&store_name).ok_or_else(|| {
            VaultCredsError::Other(anyhow::anyhow!(
                "unknown store: {} (did you enable the '{}' feature flag?)",
                store_name,
                store_name
            ))
        })?
    };

    factory(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_factory(_cfg: &ClientConfig) -> Result<Arc<dyn SecretStore>> {
        Err(VaultCredsError::Other(anyhow::anyhow!("failing factory")))
    }

    #[test]
    fn test_store_registration() {
        register_store("test-store", failing_factory);

        let reg = registry().read().unwrap();
        assert!(reg.contains_key("test-store"));
    }

    #[test]
    #[cfg(feature = "mock")]
    fn test_new_mock_store() {
        let store = new_store(&ClientConfig::new(crate::StoreType::Mock)).unwrap();
        assert_eq!(store.name(), "mock");
    }

    #[test]
    #[cfg(not(feature = "http"))]
    fn test_unknown_store_error() {
        let result = new_store(&ClientConfig::new(crate::StoreType::Http));

        assert!(result.is_err());
        if let Err(e) = result {
            let err_msg = e.to_string();
            assert!(err_msg.contains("unknown store"));
            assert!(err_msg.contains("feature flag"));
        }
    }
}
