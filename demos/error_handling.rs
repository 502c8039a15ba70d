//! Error handling example.
//!
//! Demonstrates the three ways a read can fail.
//!
//! Run with: cargo run --example error_handling

use vaultcreds::backends::mock::MockStore;
use vaultcreds::{credentials, VaultCredsError};

#[tokio::main]
async fn main() -> vaultcreds::Result<()> {
    println!("=== Error Handling Example ===\n");

    let mut store = MockStore::new();

    // Example 1: Validation error, no request is made
    println!("1. Invalid credential type:");
    match credentials::fetch_raw(&store, "aws", "deploy", Some("Creds")).await {
        Err(e) if e.is_validation() => println!("   ✓ {} (reads: {})", e, store.read_count().await),
        other => println!("   Unexpected: {:?}", other.map(|c| c.lease_id)),
    }

    // Example 2: Nothing at the path
    println!("\n2. Unknown role:");
    match credentials::fetch_raw(&store, "aws", "nobody", None).await {
        Err(VaultCredsError::NotFound { path }) => println!("   ✓ nothing at {}", path),
        other => println!("   Unexpected: {:?}", other.map(|c| c.lease_id)),
    }

    // Example 3: Store unreachable, cause kept as the error source
    println!("\n3. Store unreachable:");
    store.fail_reads_with(|| VaultCredsError::Transport("connection refused".to_string()));
    match credentials::fetch_raw(&store, "aws", "deploy", None).await {
        Err(e) if e.is_transport() => {
            println!("   ✓ {}", e);
            if let Some(source) = std::error::Error::source(&e) {
                println!("   → caused by: {}", source);
            }
        }
        other => println!("   Unexpected: {:?}", other.map(|c| c.lease_id)),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
