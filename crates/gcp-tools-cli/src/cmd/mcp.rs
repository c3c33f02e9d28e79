//! Stdio MCP server: newline-delimited JSON-RPC 2.0 requests on stdin,
//! one response per request on stdout. Logging goes to stderr so the
//! protocol stream stays clean.

use crate::tools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ToolContent {
    r#type: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct ToolCallResult {
    content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    is_error: bool,
}

fn ok(id: Option<Value>, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: Some(result),
        error: None,
    }
}

fn fail(id: Option<Value>, code: i32, message: String) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError { code, message }),
    }
}

pub fn run() -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let tools = tools::all_tools();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Err(e) => fail(None, -32700, format!("parse error: {e}")),
            Ok(raw) => {
                // Notifications have no "id" key — do not respond
                let has_id = raw
                    .as_object()
                    .map(|o| o.contains_key("id"))
                    .unwrap_or(false);
                if !has_id {
                    continue;
                }
                match serde_json::from_value::<JsonRpcRequest>(raw) {
                    Err(e) => fail(None, -32600, format!("invalid request: {e}")),
                    Ok(request) => handle_request(&request, &tools),
                }
            }
        };

        let mut out = stdout.lock();
        serde_json::to_writer(&mut out, &response)?;
        writeln!(out)?;
    }

    Ok(())
}

/// Dispatch one request. Split out of the loop so tests can drive the
/// server without a process.
pub fn handle_request(req: &JsonRpcRequest, tools: &[Box<dyn tools::GcpTool>]) -> JsonRpcResponse {
    match req.method.as_str() {
        "initialize" => ok(
            req.id.clone(),
            serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "gcp-tools",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),

        "tools/list" => {
            let tool_list: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name(),
                        "description": t.description(),
                        "inputSchema": t.schema()
                    })
                })
                .collect();
            ok(req.id.clone(), serde_json::json!({ "tools": tool_list }))
        }

        "tools/call" => {
            let params = match &req.params {
                Some(p) => p,
                None => return fail(req.id.clone(), -32602, "missing params".to_string()),
            };

            let tool_name = match params["name"].as_str() {
                Some(n) => n,
                None => {
                    return fail(
                        req.id.clone(),
                        -32602,
                        "missing tool name in params".to_string(),
                    );
                }
            };

            let args = params.get("arguments").cloned().unwrap_or(Value::Null);

            match tools.iter().find(|t| t.name() == tool_name) {
                None => fail(
                    req.id.clone(),
                    -32601,
                    format!("tool not found: {tool_name}"),
                ),
                Some(tool) => {
                    let (text, is_error) = match tool.call(args) {
                        Ok(v) => (
                            serde_json::to_string_pretty(&v)
                                .unwrap_or_else(|e| format!("serialization error: {e}")),
                            false,
                        ),
                        Err(e) => (e, true),
                    };

                    let call_result = ToolCallResult {
                        content: vec![ToolContent {
                            r#type: "text",
                            text,
                        }],
                        is_error,
                    };

                    ok(
                        req.id.clone(),
                        serde_json::to_value(&call_result)
                            .unwrap_or_else(|e| serde_json::json!({"error": e.to_string()})),
                    )
                }
            }
        }

        other => fail(
            req.id.clone(),
            -32601,
            format!("method not found: {other}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_req(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: Some(Value::Number(id.into())),
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn initialize_returns_capabilities() {
        let tools = tools::all_tools();
        let req = make_req(
            1,
            "initialize",
            Some(serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "0.0.1"}
            })),
        );

        let resp = handle_request(&req, &tools);
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert!(result["capabilities"]["tools"].is_object());
        assert_eq!(result["serverInfo"]["name"], "gcp-tools");
    }

    #[test]
    fn tools_list_returns_both_operations() {
        let tools = tools::all_tools();
        let req = make_req(2, "tools/list", Some(serde_json::json!({})));

        let resp = handle_request(&req, &tools);
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        let tool_list = result["tools"].as_array().unwrap();
        assert_eq!(tool_list.len(), 2);

        let names: Vec<&str> = tool_list
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"setup_foundation_project"));
        assert!(names.contains(&"setup_github_secrets"));
    }

    #[test]
    fn tools_call_unknown_tool_returns_error() {
        let tools = tools::all_tools();
        let req = make_req(
            3,
            "tools/call",
            Some(serde_json::json!({
                "name": "nonexistent_tool",
                "arguments": {}
            })),
        );

        let resp = handle_request(&req, &tools);
        assert!(resp.result.is_none());
        assert!(resp.error.is_some());
        assert_eq!(resp.error.unwrap().code, -32601);
    }

    #[test]
    fn tools_call_validation_failure_is_error_payload() {
        let tools = tools::all_tools();
        let req = make_req(
            4,
            "tools/call",
            Some(serde_json::json!({
                "name": "setup_foundation_project",
                "arguments": {}
            })),
        );

        let resp = handle_request(&req, &tools);
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["status"], "failed");
        assert!(payload["message"].as_str().unwrap().contains("projectName"));
    }

    #[test]
    fn unknown_method_returns_method_not_found() {
        let tools = tools::all_tools();
        let req = make_req(5, "unknown/method", None);

        let resp = handle_request(&req, &tools);
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert!(err.message.contains("method not found"));
    }

    #[test]
    fn tools_call_missing_params_returns_error() {
        let tools = tools::all_tools();
        let req = make_req(6, "tools/call", None);

        let resp = handle_request(&req, &tools);
        assert!(resp.result.is_none());
        assert_eq!(resp.error.unwrap().code, -32602);
    }
}
