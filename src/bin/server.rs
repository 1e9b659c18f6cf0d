//! compgraph server - component graph extraction over JSON-RPC.
//!
//! Runs a JSON-RPC 2.0 server over STDIO. A visualization host sends the
//! project's files with `setProject` and reads the graph back with
//! `getGraph`, `print`, `roots`, `stats` and `diagnostics`.
//!
//! Usage:
//!   compgraph-server [config.toml]
//!
//! Without a config path, defaults are used.

use std::path::PathBuf;
use std::sync::Arc;

use compgraph::{Extractor, ExtractorConfig};
use tracing::info;

fn main() {
    // Initialize tracing to stderr (stdout carries the protocol)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!(config = %path.display(), "loading config");
            ExtractorConfig::load(&path)
        }
        None => ExtractorConfig::default(),
    };

    let extractor = Arc::new(Extractor::new(config));
    info!("server ready, waiting for JSON-RPC requests on stdin");

    // Blocks until stdin closes
    compgraph::rpc::server::run(extractor);
}
