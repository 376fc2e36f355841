use std::time::Instant;

use anyhow::Result;
use log::{error, info};
use mockmate_lib::api::{ApiClient, ApiError};
use mockmate_lib::config::ClientConfig;
use mockmate_lib::session::{CredentialHub, SessionManager};

/// Asks the public question bank for its contents and returns how many
/// questions it holds.
async fn check(config: &ClientConfig) -> Result<usize, ApiError> {
    // Public endpoint only, so no stored credential is needed.
    let hub = CredentialHub::in_memory();
    let client = ApiClient::from_config(config, SessionManager::attach(&hub))?;
    Ok(client.all_questions().await?.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Reads .env as well.
    let config = ClientConfig::load()?;
    println!("🔧 Checking MockMate backend at {}", config.api_base_url);

    let started = Instant::now();
    match check(&config).await {
        Ok(count) => {
            info!("Question bank answered in {:?}", started.elapsed());
            println!("✅ Backend reachable ({} ms)", started.elapsed().as_millis());
            println!("📚 {} question(s) in the bank", count);
            Ok(())
        }
        Err(e) => {
            error!("Backend check failed: {}", e);
            println!("❌ Backend not reachable");
            if e.is_transient() {
                println!("   Is the server running at {}?", config.api_base_url);
            }
            Err(e.into())
        }
    }
}
