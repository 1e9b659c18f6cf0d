//! Protocol types: JSON-RPC 2.0 message structures and method payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::{Diagnostic, GraphStats};
use crate::project::SourceFile;

// ─── JSON-RPC 2.0 Base Types ────────────────────────────────────

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// A `setProject` arrived while another run was still in flight.
pub const RUN_IN_PROGRESS: i64 = -32001;
/// A graph query arrived before any project was set.
pub const NO_PROJECT: i64 = -32002;

/// An incoming JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// An outgoing JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

// ─── Method Payloads ────────────────────────────────────────────

/// initialize result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub server_info: ServerInfo,
    pub methods: Vec<&'static str>,
}

/// Server identity.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// setProject params: `{ "files": [{ "source": ..., "content": ... }] }`.
#[derive(Debug, Deserialize)]
pub struct SetProjectParams {
    pub files: Vec<SourceFile>,
}

/// setProject result: a summary of the finished run.
#[derive(Debug, Serialize)]
pub struct SetProjectResult {
    pub stats: GraphStats,
    pub diagnostics: Vec<Diagnostic>,
}

/// One entry of the roots result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootEntry {
    pub id: String,
    pub name: String,
    pub descendant_count: usize,
}
