//! Store implementations.

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "http")]
pub mod http;

/// Registers all compiled stores with the factory.
///
/// Called once by [`crate::init`].
pub fn register_all() {
    #[cfg(feature = "mock")]
    mock::register();

    #[cfg(feature = "http")]
    http::register();
}
