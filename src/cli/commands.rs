//! Command implementations

use std::time::Duration;

use anyhow::bail;

use crate::config::AppConfig;
use crate::create_storage_service;
use crate::infrastructure::logging;

use super::Command;

/// Runs one maintenance command against the configured stores
pub async fn run(command: Command) -> anyhow::Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config);

    let service = create_storage_service(&config)?;

    if !service.start().await {
        bail!("storage is unavailable");
    }

    let storage = service.storage();

    match command {
        Command::Stats => {
            let persistent_keys = storage.persistent().keys().await.len();
            let session_keys = storage.session().keys().await.len();
            let size = storage.approx_size().await;

            println!("persistent entries: {}", persistent_keys);
            println!("session entries:    {}", session_keys);
            println!("approximate size:   {} bytes", size);
        }
        Command::Keys => {
            let mut keys = storage.persistent().keys().await;
            keys.sort();

            for key in keys {
                println!("{}", key);
            }
        }
        Command::Get { key } => match storage.persistent().get::<serde_json::Value>(&key).await {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => bail!("key '{}' not found (or expired)", key),
        },
        Command::Set {
            key,
            value,
            ttl_secs,
        } => {
            let value: serde_json::Value = serde_json::from_str(&value)?;
            let ttl = ttl_secs.map(Duration::from_secs);

            if !storage.persistent().set(&key, &value, ttl).await {
                bail!("failed to write '{}'", key);
            }
            println!("ok");
        }
        Command::Remove { key } => {
            if !storage.persistent().remove(&key).await {
                bail!("failed to remove '{}'", key);
            }
            println!("ok");
        }
        Command::Cleanup => {
            let corrupted = storage.cleanup_corrupted().await;
            let expired = storage.cleanup().await;

            println!("corrupted removed: {}", corrupted);
            println!("expired evicted:   {}", expired);
        }
        Command::Clear => {
            if !storage.clear_all().await {
                bail!("failed to clear storage");
            }
            println!("ok");
        }
    }

    service.shutdown().await;

    Ok(())
}

fn init_logging(config: &AppConfig) {
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });
}
