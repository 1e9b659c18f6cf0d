//! Method implementations: maps JSON-RPC calls to extractor operations.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::types::*;
use crate::error::ExtractError;
use crate::extractor::Extractor;
use crate::graph::Extraction;

/// Every method the server answers, in the order they are advertised.
pub const METHODS: &[&str] = &[
    "initialize",
    "setProject",
    "getGraph",
    "print",
    "roots",
    "stats",
    "diagnostics",
    "ping",
];

pub type MethodResult = std::result::Result<Value, JsonRpcError>;

/// Dispatch one extractor method.
pub fn call_method(extractor: &Extractor, method: &str, params: &Value) -> MethodResult {
    match method {
        "setProject" => handle_set_project(extractor, params),
        "getGraph" => with_latest(extractor, |e| encode(e.graph.to_document())),
        "print" => with_latest(extractor, |e| Ok(Value::String(e.graph.print()))),
        "roots" => with_latest(extractor, handle_roots),
        "stats" => with_latest(extractor, |e| encode(e.stats())),
        "diagnostics" => with_latest(extractor, |e| encode(&e.diagnostics)),
        _ => Err(JsonRpcError {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {}", method),
        }),
    }
}

fn handle_set_project(extractor: &Extractor, params: &Value) -> MethodResult {
    let params: SetProjectParams = serde_json::from_value(params.clone()).map_err(|e| JsonRpcError {
        code: INVALID_PARAMS,
        message: format!("Invalid params: {}", e),
    })?;

    match extractor.set_project(params.files) {
        Ok(extraction) => encode(SetProjectResult {
            stats: extraction.stats(),
            diagnostics: extraction.diagnostics.clone(),
        }),
        Err(ExtractError::RunInProgress) => Err(JsonRpcError {
            code: RUN_IN_PROGRESS,
            message: ExtractError::RunInProgress.to_string(),
        }),
        Err(e) => Err(internal(e)),
    }
}

fn handle_roots(extraction: &Extraction) -> MethodResult {
    let graph = &extraction.graph;
    let roots: Vec<RootEntry> = graph
        .roots()
        .into_iter()
        .map(|root| RootEntry {
            id: root.id.to_string(),
            name: root.name.clone(),
            descendant_count: graph.count_descendants(root.id),
        })
        .collect();
    encode(roots)
}

/// Run `f` on the latest extraction, or fail if no project was set yet.
fn with_latest(
    extractor: &Extractor,
    f: impl FnOnce(&Extraction) -> MethodResult,
) -> MethodResult {
    let latest: Arc<Extraction> = extractor.latest().ok_or_else(|| JsonRpcError {
        code: NO_PROJECT,
        message: "no project has been set".to_string(),
    })?;
    f(&latest)
}

fn encode(value: impl Serialize) -> MethodResult {
    serde_json::to_value(value).map_err(internal)
}

fn internal(e: impl std::fmt::Display) -> JsonRpcError {
    JsonRpcError {
        code: INTERNAL_ERROR,
        message: e.to_string(),
    }
}
