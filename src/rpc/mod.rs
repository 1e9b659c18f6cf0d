//! JSON-RPC server module.
//!
//! Provides a JSON-RPC 2.0 over STDIO interface for visualization hosts
//! to submit a project and fetch its component graph.

pub mod methods;
pub mod server;
pub mod types;
