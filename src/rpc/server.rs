//! JSON-RPC 2.0 server: reads requests from stdin, writes responses to stdout.
//!
//! Newline-delimited JSON over STDIO. Tracing output goes to stderr so it
//! doesn't interfere with the protocol.
//!
//! `setProject` runs on its own thread so the loop keeps answering while an
//! extraction is in flight; a second `setProject` sent meanwhile is answered
//! with a run-in-progress error. All other methods are answered inline.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::methods::{call_method, METHODS};
use super::types::*;
use crate::extractor::Extractor;

/// Run the server on the process's stdin and stdout until stdin closes.
pub fn run(extractor: Arc<Extractor>) {
    let stdin = io::stdin();
    serve(&extractor, stdin.lock(), io::stdout());
}

/// Serve requests from `input`, writing responses to `output`.
///
/// Returns once `input` is exhausted and every spawned run has answered.
pub fn serve<R, W>(extractor: &Extractor, input: R, output: W)
where
    R: BufRead,
    W: Write + Send,
{
    info!("server starting");
    let output = Mutex::new(output);

    thread::scope(|scope| {
        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    error!(error = %e, "failed to read stdin");
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!(request = %trimmed, "received request");

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "invalid JSON-RPC request");
                    let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                    write_response(&output, &response);
                    continue;
                }
            };

            if request.method == "setProject" {
                let output = &output;
                scope.spawn(move || {
                    if let Some(response) = handle_request(extractor, &request) {
                        write_response(output, &response);
                    }
                });
                continue;
            }

            if let Some(response) = handle_request(extractor, &request) {
                write_response(&output, &response);
            }
        }
    });

    info!("server shutting down");
}

/// Handle a single JSON-RPC request and return a response (or None for notifications).
pub fn handle_request(extractor: &Extractor, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = request.id.clone();

    match request.method.as_str() {
        "initialize" => {
            info!("client initializing");
            let result = InitializeResult {
                server_info: ServerInfo {
                    name: "compgraph".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                methods: METHODS.to_vec(),
            };
            Some(match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
            })
        }

        "notifications/initialized" => {
            info!("client initialized");
            None // Notifications don't get responses
        }

        "ping" => Some(JsonRpcResponse::success(id, Value::Object(Default::default()))),

        method => {
            debug!(method, "calling method");
            let response = match call_method(extractor, method, &request.params) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => {
                    warn!(method, code = e.code, message = %e.message, "request failed");
                    JsonRpcResponse::error(id, e.code, e.message)
                }
            };
            Some(response)
        }
    }
}

/// Write a JSON-RPC response (newline-delimited).
fn write_response<W: Write>(output: &Mutex<W>, response: &JsonRpcResponse) {
    let json = serde_json::to_string(response).unwrap_or_default();
    debug!(response = %json, "sending response");
    let mut output = output.lock().unwrap_or_else(|e| e.into_inner());
    let _ = writeln!(output, "{}", json);
    let _ = output.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn responses(extractor: &Extractor, input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        serve(extractor, input.as_bytes(), &mut out);
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_initialize_and_ping() {
        let extractor = Extractor::default();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#, "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#, "\n",
        );
        let out = responses(&extractor, input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["result"]["serverInfo"]["name"], "compgraph");
        assert_eq!(out[1], json!({ "jsonrpc": "2.0", "id": 2, "result": {} }));
    }

    #[test]
    fn test_parse_error_response() {
        let extractor = Extractor::default();
        let out = responses(&extractor, "{not json\n");
        assert_eq!(out[0]["error"]["code"], PARSE_ERROR);
    }

    #[test]
    fn test_set_project_over_stdio() {
        let extractor = Extractor::default();
        let set = json!({
            "jsonrpc": "2.0", "id": 7, "method": "setProject",
            "params": { "files": [{ "source": "A.jsx", "content": "function A() { return <div/>; }" }] }
        });
        let out = responses(&extractor, &format!("{}\n", set));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 7);
        assert_eq!(out[0]["result"]["stats"]["componentCount"], 1);

        // the finished run is visible to later sessions on the same extractor
        let get = r#"{"jsonrpc":"2.0","id":8,"method":"getGraph"}"#;
        let out = responses(&extractor, &format!("{}\n", get));
        assert_eq!(out[0]["result"]["componentList"][0]["name"], "A");
    }

    #[test]
    fn test_handle_request_unknown_method() {
        let extractor = Extractor::default();
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"method":"nope"}"#).unwrap();
        let response = handle_request(&extractor, &request).unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }
}
