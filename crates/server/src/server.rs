use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::Value;
use snappr_mcp_tools::{SnapprError, SnapprGateway};
use tracing::debug;

pub const SERVER_NAME: &str = "snappr-api";

const INSTRUCTIONS: &str = "Tools for the Snappr photography platform. \
Start with list_shoot_types (or list_editing_job_types) to discover valid type names, \
check_coverage and find_availability before create_booking, and use get_booking / \
get_booking_media to follow up on existing bookings. create_booking and create_editing_job \
create a new record on every call. Failed calls return isError results with the upstream \
status and body.";

/// rmcp server handler exposing the Snappr tools.
#[derive(Debug, Clone)]
pub struct SnapprMcpServer {
    gateway: SnapprGateway,
}

impl SnapprMcpServer {
    #[must_use]
    pub fn new(gateway: SnapprGateway) -> Self {
        Self { gateway }
    }

    #[must_use]
    pub fn gateway(&self) -> &SnapprGateway {
        &self.gateway
    }
}

impl ServerHandler for SnapprMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.gateway.list_tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(tool = %request.name, "tools/call");
        let arguments = request.arguments.map_or(Value::Null, Value::Object);
        self.gateway
            .call_tool(&request.name, arguments)
            .await
            .map_err(to_error_data)
    }
}

fn to_error_data(err: SnapprError) -> ErrorData {
    match err {
        SnapprError::UnknownTool(name) => {
            ErrorData::invalid_params(format!("Unknown tool '{name}'"), None)
        }
        other => ErrorData::internal_error(other.to_string(), None),
    }
}
