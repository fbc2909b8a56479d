use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, schemars, tool, tool_handler, tool_router};
use serde::{Deserialize, Serialize};

use crate::document_parser::{ErrorResponse, ParseResponse, parse_upload};
use crate::error::ParseError;
use crate::limits::Limits;
use crate::shared_utils::check_file_size;

pub const SERVICE_NAME: &str = "nexaris-file-parser";

/// File parser exposed as MCP tools
#[derive(Clone)]
pub struct FileParserServer {
    limits: Arc<Limits>,
    tool_router: ToolRouter<FileParserServer>,
}

/// Input for the parse_file tool
#[derive(Serialize, Deserialize, Debug, Default, schemars::JsonSchema)]
pub struct ParseFileInput {
    #[schemars(description = "Path to a .xlsx/.xls/.csv/.pdf file to read from disk")]
    pub file_path: Option<String>,
    #[schemars(description = "Declared file name; its extension selects the parser")]
    pub file_name: Option<String>,
    #[schemars(description = "File content encoded as standard base64, instead of file_path")]
    pub content_base64: Option<String>,
}

/// Reply of the health tool
#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub limits: Limits,
}

#[tool_router]
impl FileParserServer {
    pub fn new(limits: Arc<Limits>) -> Self {
        Self {
            limits,
            tool_router: Self::tool_router(),
        }
    }

    /// Parse a spreadsheet, CSV or PDF file into a text transcript
    #[tool(
        description = "Parse an Excel, CSV or PDF file into a plain-text transcript with one block per sheet or page. Pass either file_path, or file_name plus content_base64."
    )]
    async fn parse_file(
        &self,
        Parameters(input): Parameters<ParseFileInput>,
    ) -> Result<CallToolResult, McpError> {
        let limits = Arc::clone(&self.limits);

        let response = tokio::task::spawn_blocking(move || handle_parse_request(input, &limits))
            .await
            .unwrap_or_else(|e| {
                ParseResponse::Failure(ParseError::Internal(format!("Parse task failed: {}", e)).into())
            });

        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {}", e), None))?;

        if response.is_success() {
            Ok(CallToolResult::success(vec![Content::text(json)]))
        } else {
            Ok(CallToolResult::error(vec![Content::text(json)]))
        }
    }

    /// Report liveness and the active limits
    #[tool(description = "Report service health and the active parsing limits")]
    async fn health(&self) -> Result<CallToolResult, McpError> {
        let status = HealthStatus {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            limits: *self.limits,
        };
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Failed to serialize health: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for FileParserServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "This server converts Excel, CSV and PDF files into a fixed-structure text transcript (=== Sheet: <name> === / === Page: <n> === blocks)."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

/// Turn tool input into bytes plus a name, then parse.
///
/// Inline content wins over a path. A path is size-checked on disk before it
/// is read so an oversized file never gets loaded.
pub fn handle_parse_request(input: ParseFileInput, limits: &Limits) -> ParseResponse {
    match load_input(input, limits) {
        Ok((bytes, name)) => parse_upload(Some(bytes), Some(name), limits),
        Err(e) => ParseResponse::Failure(ErrorResponse::from(e)),
    }
}

fn load_input(input: ParseFileInput, limits: &Limits) -> Result<(Vec<u8>, String), ParseError> {
    let ParseFileInput {
        file_path,
        file_name,
        content_base64,
    } = input;

    let name_from_path = file_path.as_deref().and_then(|path| {
        Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    });
    let name = file_name.or(name_from_path).ok_or(ParseError::MissingInput)?;

    if let Some(encoded) = content_base64 {
        // Undecodable content means no usable file was supplied
        let bytes = BASE64.decode(encoded.trim()).map_err(|e| {
            log::warn!("Rejecting invalid base64 content for {}: {}", name, e);
            ParseError::MissingInput
        })?;
        return Ok((bytes, name));
    }

    let path = file_path.ok_or(ParseError::MissingInput)?;
    let metadata = std::fs::metadata(&path)
        .map_err(|e| ParseError::Internal(format!("Failed to read {}: {}", path, e)))?;
    check_file_size(metadata.len(), limits.max_file_size_bytes)?;

    let bytes = std::fs::read(&path)
        .map_err(|e| ParseError::Internal(format!("Failed to read {}: {}", path, e)))?;
    Ok((bytes, name))
}

/// Serve the MCP tools over stdio until the client disconnects
pub async fn start_server(limits: Arc<Limits>) -> Result<()> {
    log::info!("Starting {} with limits {:?}", SERVICE_NAME, limits);

    let server = FileParserServer::new(limits).serve(stdio()).await?;

    let quit_reason = server.waiting().await?;
    log::info!("Server stopped: {:?}", quit_reason);

    Ok(())
}
