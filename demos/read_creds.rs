//! Read AWS credentials from a running Vault server.
//!
//! Uses the standard Vault environment (`VAULT_ADDR`, `VAULT_TOKEN`, ...).
//!
//! Run with:
//!   RUST_LOG=vaultcreds=debug cargo run --example read_creds -- aws deploy sts

use tracing_subscriber::EnvFilter;
use vaultcreds::data_source::{AwsSecretDataSource, AwsSecretParams};
use vaultcreds::ClientConfig;

#[tokio::main]
async fn main() -> vaultcreds::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let backend = args.next().unwrap_or_else(|| "aws".to_string());
    let role = args.next().unwrap_or_else(|| "deploy".to_string());
    let kind = args.next().unwrap_or_else(|| "creds".to_string());

    let config = ClientConfig::from_env()?;
    println!("Vault: {}", config.address);

    let source = AwsSecretDataSource::from_config(&config)?;
    let params = AwsSecretParams::new(backend, role).with_type(kind);
    let creds = source.read_credentials(&params).await?;

    println!("lease_id:        {}", creds.lease_id);
    println!("access_key:      {}", creds.access_key.as_deref().unwrap_or("-"));
    println!("security_token:  {}", if creds.security_token.is_some() { "present" } else { "-" });
    println!("lease_duration:  {}s", creds.lease_duration);
    println!("lease_renewable: {}", creds.lease_renewable);
    match creds.lease_expires_at() {
        Some(at) => println!("expires_at:      {}", at.to_rfc3339()),
        None => println!("expires_at:      out of range"),
    }

    Ok(())
}
