//! Newline-delimited JSON-RPC 2.0 over stdio: the `initialize` handshake,
//! `tools/list` and `tools/call`. Requests without an id are notifications
//! and get no reply.

use crate::error::CliError;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tools::{ToolError, ToolRegistry};
use tracing::{debug, info, warn};

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

pub async fn run(registry: ToolRegistry) -> Result<(), CliError> {
    info!(tools = registry.names().len(), "serving on stdio");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "unparseable request line");
                let response = json!({
                    "jsonrpc": "2.0",
                    "id": Value::Null,
                    "error": { "code": PARSE_ERROR, "message": format!("Parse error: {err}") },
                });
                write_line(&mut stdout, &response).await?;
                continue;
            }
        };

        let Some(id) = request.id else {
            debug!(method = %request.method, "notification, no reply");
            continue;
        };

        let response = match handle(&registry, &request.method, request.params).await {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message },
            }),
        };
        write_line(&mut stdout, &response).await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

async fn handle(
    registry: &ToolRegistry,
    method: &str,
    params: Value,
) -> Result<Value, (i64, String)> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": "tickerdesk",
                "version": env!("CARGO_PKG_VERSION"),
            },
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": registry.schemas() })),
        "tools/call" => {
            let name = params["name"]
                .as_str()
                .ok_or((INVALID_PARAMS, "'name' is required".to_string()))?;
            let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
            match registry.execute(name, arguments).await {
                Ok(text) => Ok(json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": false,
                })),
                Err(ToolError::UnknownTool(tool)) => {
                    Err((INVALID_PARAMS, format!("Unknown tool: {tool}")))
                }
                Err(ToolError::InvalidParams(message)) => Err((INVALID_PARAMS, message)),
                // Runtime failures (source down, malformed condition) come
                // back as tool results so the caller sees them in-band.
                Err(err) => Ok(json!({
                    "content": [{ "type": "text", "text": err.to_string() }],
                    "isError": true,
                })),
            }
        }
        other => Err((METHOD_NOT_FOUND, format!("Method not found: {other}"))),
    }
}

async fn write_line(
    stdout: &mut tokio::io::Stdout,
    response: &Value,
) -> Result<(), CliError> {
    let line = serde_json::to_string(response).map_err(CliError::JsonSerialize)?;
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
