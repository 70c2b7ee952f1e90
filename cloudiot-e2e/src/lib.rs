pub mod config;
pub mod fixtures;
pub mod helpers;
pub mod ids;
pub mod pubsub;
pub mod scenarios;
pub mod suite;
pub mod util;

// === CLI entrypoint ===
pub mod cli;

pub use helpers::{E2EError, E2EResult};

/// Entrypoint used by `main.rs` to run the full CLI.
pub async fn run_cli() -> anyhow::Result<()> {
    cli::cli().await
}
