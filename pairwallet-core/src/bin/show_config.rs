use anyhow::Context;
use pairwallet_core::WalletCoreConfig;

fn mask(secret: &str) -> String {
    match secret.len() {
        0 => "(not set)".to_string(),
        1..=8 => "********".to_string(),
        n => format!(
            "{}…{}",
            secret.get(..4).unwrap_or("****"),
            secret.get(n - 4..).unwrap_or("****")
        ),
    }
}

fn main() -> anyhow::Result<()> {
    pairwallet_core::init();
    let config = WalletCoreConfig::load().context("Failed to load wallet core configuration")?;

    println!("{} {} configuration:\n", pairwallet_core::NAME, pairwallet_core::VERSION);
    println!("  RPC URL: {}", config.rpc_url);
    println!("  Chain ID: {}", config.chain_id);
    println!("  Project ID: {}", mask(&config.project_id));
    println!("  Relay URL: {}", config.relay_url);
    println!("  Metadata: {} ({})", config.metadata.name, config.metadata.url);
    println!("  Network timeout: {} ms", config.network_timeout_ms);
    println!("  Confirmation timeout: {} ms", config.confirmation_timeout_ms);
    println!("  Storage dir: {}", config.resolved_storage_dir().display());
    println!("  Grant policy: {:?}", config.grant_policy);
    if config.grant_policy == pairwallet_core::shared::config::GrantPolicy::Fixed {
        println!("  Fixed grant address: {}", config.fixed_grant_address);
    }
    println!("  Persist sessions: {}", config.persist_sessions);
    Ok(())
}
