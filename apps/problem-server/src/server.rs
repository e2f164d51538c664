//! MCP tool server exposing `get_coding_problems`.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, warn};

use crate::problems::{self, Difficulty};

pub const INVALID_DIFFICULTY: &str = "Error: Invalid difficulty.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProblemRequest {
    /// Problem difficulty: "easy", "medium" or "hard".
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

#[derive(Clone)]
pub struct ProblemServer {
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ProblemServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Get a random coding problem for the candidate to solve. \
            Use this when the interview moves to the coding round."
    )]
    async fn get_coding_problems(
        &self,
        Parameters(request): Parameters<ProblemRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = match Difficulty::parse(&request.difficulty) {
            Some(difficulty) => {
                let problem = problems::pick(difficulty);
                info!("Serving {:?} problem: {}", difficulty, problem.title);
                problems::describe(&problem)
            }
            None => {
                warn!("Rejected difficulty '{}'", request.difficulty);
                INVALID_DIFFICULTY.to_string()
            }
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for ProblemServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some("Hands out coding interview problems by difficulty.".to_string()),
            ..Default::default()
        }
    }
}
