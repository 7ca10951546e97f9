//! Line-delimited JSON-RPC server (MCP over stdio).
//!
//! ```text
//! stdin --line--> McpServer --tools/call--> tools --> Service --> Backend
//! stdout <-line-- McpServer <--------------------------'
//! ```
//!
//! One request is handled to completion, response written and flushed,
//! before the next line is read.

pub mod error;
pub mod protocol;
pub mod tools;

pub use error::McpError;
pub use protocol::{JsonRpcRequest, JsonRpcResponse};

use serde_json::Value;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, info, warn};

use crate::service::Service;
use protocol::{
    InitializeResult, ListToolsResult, ServerCapabilities, ServerInfo, MCP_PROTOCOL_VERSION,
};

/// Longest request line accepted, newline excluded.
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// One framed read from the input.
enum Frame {
    Eof,
    Line,
    Oversized,
}

/// The protocol engine.
pub struct McpServer {
    service: Service,
    max_line_bytes: usize,
}

impl McpServer {
    pub fn new(service: Service) -> Self {
        Self {
            service,
            max_line_bytes: MAX_LINE_BYTES,
        }
    }

    /// Override the request line limit.
    pub fn with_max_line_bytes(mut self, limit: usize) -> Self {
        self.max_line_bytes = limit;
        self
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Serve on the process stdin/stdout until EOF.
    pub async fn serve_stdio(&self) -> Result<(), McpError> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.run(reader, writer).await
    }

    /// Serve requests from `reader`, writing one response line per request.
    ///
    /// Returns at EOF. Malformed lines (bad JSON, invalid UTF-8, over the
    /// length limit) produce an error response and the loop continues; only
    /// I/O failures end it early.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            name = %self.service.config().server.name,
            version = %self.service.config().server.version,
            "MCP server starting"
        );

        let mut buf = Vec::new();
        loop {
            let response = match read_frame(&mut reader, &mut buf, self.max_line_bytes).await? {
                Frame::Eof => break,
                Frame::Oversized => {
                    warn!(limit = self.max_line_bytes, "request line too long");
                    JsonRpcResponse::from_mcp_error(
                        Value::Null,
                        McpError::ParseError {
                            message: format!("request line exceeds {} bytes", self.max_line_bytes),
                        },
                    )
                }
                Frame::Line if buf.iter().all(u8::is_ascii_whitespace) => continue,
                Frame::Line => self.handle_line(&buf).await,
            };

            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }

        info!("input closed, MCP server stopped");
        Ok(())
    }

    /// Decode one raw line and produce its response.
    pub async fn handle_line(&self, line: &[u8]) -> JsonRpcResponse {
        let request: JsonRpcRequest = match serde_json::from_slice(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                return JsonRpcResponse::from_mcp_error(
                    Value::Null,
                    McpError::ParseError {
                        message: e.to_string(),
                    },
                );
            }
        };
        self.handle_request(request).await
    }

    /// Dispatch a decoded request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, id = %request.id, "received request");
        let id = request.id;

        match self.dispatch(&request.method, &request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                warn!(method = %request.method, code = e.error_code(), error = %e, "request failed");
                JsonRpcResponse::from_mcp_error(id, e)
            }
        }
    }

    async fn dispatch(&self, method: &str, params: &Value) -> Result<Value, McpError> {
        match method {
            "initialize" => Ok(serde_json::to_value(self.initialize_result())?),
            "tools/list" => Ok(serde_json::to_value(ListToolsResult {
                tools: tools::catalogue().to_vec(),
            })?),
            "tools/call" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| McpError::invalid_params("invalid tool name"))?;
                let empty = Value::Object(Default::default());
                let arguments = params
                    .get("arguments")
                    .filter(|a| a.is_object())
                    .unwrap_or(&empty);
                let result = tools::call(&self.service, name, arguments).await?;
                Ok(serde_json::to_value(result)?)
            }
            other => Err(McpError::MethodNotFound {
                method: other.to_string(),
            }),
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        let server = &self.service.config().server;
        InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: server.name.clone(),
                version: server.version.clone(),
            },
            capabilities: ServerCapabilities::default(),
        }
    }
}

/// Read the next line into `buf`, holding at most `limit + 1` bytes of it.
///
/// The rest of an oversized line is consumed and dropped.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let read = (&mut *reader).take(cap).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(Frame::Eof);
    }

    let complete = buf.last() == Some(&b'\n');
    let body = if complete { buf.len() - 1 } else { buf.len() };
    if body <= limit {
        return Ok(Frame::Line);
    }
    if !complete {
        skip_line(reader).await?;
    }
    Ok(Frame::Oversized)
}

async fn skip_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}
