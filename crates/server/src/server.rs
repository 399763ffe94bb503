//! The MCP server handler.

use crate::resources::DocsResource;
use crate::tools::JulesTools;
use jules_api::JulesClient;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, ListResourcesResult, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ReadResourceRequestParams, ReadResourceResult,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use std::future::Future;
use std::time::Instant;

const INSTRUCTIONS: &str = "Drive Jules coding sessions.\n\
1) list-sources to find a repository (owner/repo and GitHub URLs are accepted as source).\n\
2) create-session with a prompt and source.\n\
3) list-activities to follow progress; approve-session-plan when a plan awaits approval.\n\
4) send-session-message to give further instructions.\n\
List tools accept pageSize and pageToken (pass the previous nextPageToken).\n\
The jules-doc://spec resource summarizes the API.";

#[derive(Clone)]
pub struct JulesMcpServer {
    tools: JulesTools,
    docs: DocsResource,
}

impl JulesMcpServer {
    #[must_use]
    pub fn new(client: JulesClient, docs: DocsResource) -> Self {
        Self {
            tools: JulesTools::new(client),
            docs,
        }
    }
}

impl ServerHandler for JulesMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "jules-mcp".to_string(),
                title: Some("Jules MCP".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tools.list(),
            ..Default::default()
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let name = request.name.to_string();
            let started = Instant::now();
            tracing::debug!(tool = %name, "tools/call");

            let outcome = self.tools.call(&name, request.arguments).await;
            let elapsed_ms = started.elapsed().as_millis();
            match outcome {
                Ok(result) => {
                    tracing::info!(tool = %name, elapsed_ms, "tool call ok");
                    Ok(result)
                }
                Err(e) => {
                    tracing::info!(tool = %name, elapsed_ms, error = %e, "tool call failed");
                    e.into_call_result()
                }
            }
        }
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListResourcesResult {
            resources: self.docs.list(),
            ..Default::default()
        }))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move { self.docs.read(&request.uri).await }
    }
}
