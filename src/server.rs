use crate::http::GitHubApi;
use crate::mcp::PROTOCOL_VERSION;
use crate::tools::{call_tool, tool_descriptors, ToolError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub const SERVER_NAME: &str = "kite-mcp-server";

// Minimal JSON-RPC 2.0 types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Id {
    Str(String),
    Num(i64),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

fn rpc_error(id: Option<Id>, code: i64, message: &str) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.into(),
            data: None,
        }),
        id,
    }
}

fn rpc_ok(id: Option<Id>, result: Value) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: Some(result),
        error: None,
        id,
    }
}

#[derive(Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Routes JSON-RPC requests to the tool layer. Holds only read-only state.
pub struct Server {
    api: Arc<dyn GitHubApi>,
}

impl Server {
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self { api }
    }

    /// Handle one raw frame. Returns `None` for notifications (requests without an id).
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                return Some(rpc_error(None, PARSE_ERROR, &format!("Parse error: {}", e)));
            }
        };
        // Echo whatever id could be recovered so the client can correlate the failure.
        let raw_id = raw
            .get("id")
            .and_then(|id| serde_json::from_value::<Id>(id.clone()).ok());
        let req: Request = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                return Some(rpc_error(
                    raw_id,
                    INVALID_REQUEST,
                    &format!("Invalid Request: {}", e),
                ));
            }
        };
        if req.jsonrpc != "2.0" {
            return Some(rpc_error(
                req.id,
                INVALID_REQUEST,
                "Invalid Request: jsonrpc must be \"2.0\"",
            ));
        }
        debug!("Received method={}", req.method);
        if req.id.is_none() {
            debug!("Notification {} acknowledged", req.method);
            return None;
        }
        Some(self.dispatch(req).await)
    }

    async fn dispatch(&self, req: Request) -> Response {
        match req.method.as_str() {
            "initialize" => handle_initialize(req.id),
            "ping" => rpc_ok(req.id, serde_json::json!({})),
            "tools/list" => handle_tools_list(req.id),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            other => rpc_error(req.id, METHOD_NOT_FOUND, &format!("Method not found: {}", other)),
        }
    }

    async fn handle_tools_call(&self, id: Option<Id>, params: Value) -> Response {
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return rpc_error(id, INVALID_PARAMS, &format!("Invalid params: {}", e)),
        };
        info!("tools/call name={}", call.name);
        match call_tool(self.api.as_ref(), &call.name, call.arguments).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(v) => rpc_ok(id, v),
                Err(e) => rpc_error(id, INTERNAL_ERROR, &e.to_string()),
            },
            Err(e) => {
                warn!("tools/call {} rejected: {}", call.name, e);
                let code = match e {
                    ToolError::UnknownTool(_) | ToolError::UnknownGitHubTool(_) => {
                        METHOD_NOT_FOUND
                    }
                    ToolError::InvalidArguments { .. } => INVALID_PARAMS,
                };
                rpc_error(id, code, &e.to_string())
            }
        }
    }
}

fn handle_initialize(id: Option<Id>) -> Response {
    rpc_ok(
        id,
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        }),
    )
}

fn handle_tools_list(id: Option<Id>) -> Response {
    let tools = tool_descriptors();
    rpc_ok(id, serde_json::json!({ "tools": tools }))
}

async fn write_response<W: AsyncWrite + Unpin>(out: &mut W, resp: &Response) -> anyhow::Result<()> {
    let mut payload = serde_json::to_vec(resp)?;
    payload.push(b'\n');
    out.write_all(&payload).await?;
    out.flush().await?;
    Ok(())
}

/// Serve newline-delimited JSON-RPC on stdin/stdout until stdin closes.
/// Requests are answered one at a time, in arrival order.
pub async fn run_stdio_server(api: Arc<dyn GitHubApi>) -> anyhow::Result<()> {
    info!("Starting {} stdio server; protocol={}", SERVER_NAME, PROTOCOL_VERSION);
    let server = Server::new(api);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(resp) = server.handle_line(&line).await {
            write_response(&mut stdout, &resp).await?;
        }
    }
    info!("stdin closed; shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::FakeApi;

    fn server() -> Server {
        Server::new(Arc::new(FakeApi::default()))
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server().handle_line(line).await.is_none());
    }

    #[tokio::test]
    async fn requests_without_id_are_never_answered() {
        let line = r#"{"jsonrpc":"2.0","method":"tools/list"}"#;
        assert!(server().handle_line(line).await.is_none());
    }

    #[tokio::test]
    async fn valid_json_with_wrong_shape_is_invalid_request() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":4}"#)
            .await
            .unwrap();
        assert_eq!(resp.id, Some(Id::Num(4)));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);

        let resp = server()
            .handle_line(r#"{"id":"x","method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp.id, Some(Id::Str("x".into())));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);

        let resp = server()
            .handle_line(r#"{"jsonrpc":"1.0","id":5,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn garbage_is_a_parse_error() {
        let resp = server().handle_line("{not json").await.unwrap();
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn unknown_tool_maps_to_rpc_error() {
        let line = r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"nonexistent_tool","arguments":{}}}"#;
        let resp = server().handle_line(line).await.unwrap();
        assert!(resp.result.is_none());
        assert_eq!(resp.id, Some(Id::Num(7)));
        let err = resp.error.unwrap();
        assert_eq!(err.code, METHOD_NOT_FOUND);
        assert!(err.message.contains("nonexistent_tool"));
    }

    #[tokio::test]
    async fn tools_call_without_name_is_invalid_params() {
        let line = r#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{}}"#;
        let resp = server().handle_line(line).await.unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn initialize_advertises_tools_capability() {
        let line = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let resp = server().handle_line(line).await.unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }
}
