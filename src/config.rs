use crate::store::DocumentStore;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_FILE: &str = "data/database.json";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// JSON document holding all school records.
    #[arg(
        long,
        global = true,
        env = "SCHOOLBOOK_DATA_FILE",
        default_value = DEFAULT_DATA_FILE
    )]
    pub data_file: PathBuf,

    /// How long to wait for another process to release the store lock.
    #[arg(
        long,
        global = true,
        env = "SCHOOLBOOK_LOCK_TIMEOUT_MS",
        default_value_t = 5000
    )]
    pub lock_timeout_ms: u64,
}

impl Config {
    pub fn store(&self) -> DocumentStore {
        DocumentStore::new(
            self.data_file.clone(),
            Duration::from_millis(self.lock_timeout_ms),
        )
    }
}

/// `SCHOOLBOOK_LOG`, then `RUST_LOG`, then `warn`.
pub fn log_filter() -> String {
    std::env::var("SCHOOLBOOK_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string())
}
