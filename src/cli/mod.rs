//! CLI module for the Asante storage service
//!
//! Maintenance commands over the persistent store: inspect keys and sizes,
//! evict expired or corrupted entries, and read or write individual values.

pub mod commands;

use clap::{Parser, Subcommand};

/// Asante storage - namespaced, TTL-aware key-value storage
#[derive(Parser)]
#[command(name = "asante-storage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show entry counts and approximate size
    Stats,

    /// List logical keys in the persistent store
    Keys,

    /// Read a value by logical key
    Get {
        /// Logical key (prefix stripped)
        key: String,
    },

    /// Write a JSON value under a logical key
    Set {
        /// Logical key (prefix stripped)
        key: String,
        /// Value, parsed as JSON
        value: String,
        /// Optional TTL in seconds
        #[arg(long)]
        ttl_secs: Option<u64>,
    },

    /// Remove a logical key
    Remove {
        /// Logical key (prefix stripped)
        key: String,
    },

    /// Evict expired entries and remove corrupted ones
    Cleanup,

    /// Clear both namespaces
    Clear,
}
