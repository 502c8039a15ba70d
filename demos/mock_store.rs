//! Reading credentials from the in-memory store.
//!
//! Shows that every read of a dynamic role issues a new lease.
//!
//! Run with: cargo run --example mock_store

use std::sync::Arc;
use std::time::Duration;
use vaultcreds::backends::mock::MockStore;
use vaultcreds::{AwsSecretRequest, CredentialFetcher, CredentialType, PollConfig};

#[tokio::main]
async fn main() -> vaultcreds::Result<()> {
    println!("=== Mock Store Example ===\n");

    let store = MockStore::new();
    store
        .set_dynamic_role("aws", "deploy", CredentialType::Creds, 3600)
        .await;
    store.set_dynamic_role("aws", "ci", CredentialType::Sts, 900).await;
    store.set_pending("aws/sts/ci", 2).await;
    let store = Arc::new(store);

    let fetcher = CredentialFetcher::new(store.clone());
    let request = AwsSecretRequest::new("aws", "deploy")?;

    println!("1. Two reads of {}:", request.path());
    for _ in 0..2 {
        let creds = fetcher.fetch(&request).await?;
        println!("   {} ({:?})", creds.lease_id, creds.access_key);
    }

    println!("\n2. Polling a role whose credentials are not ready yet:");
    let poll = PollConfig::bounded(4, Duration::from_millis(100), Duration::from_millis(400));
    println!("   worst-case wait: {:?}", poll.worst_case_delay());
    let sts = AwsSecretRequest::new("aws", "ci")?.with_type(CredentialType::Sts);
    let creds = fetcher.clone().with_poll(poll).fetch(&sts).await?;
    println!("   {} after {} reads", creds.lease_id, store.read_count().await - 2);

    println!("\n=== Example Complete ===");
    Ok(())
}
