pub mod github;
pub mod hello_world;

use crate::http::GitHubApi;
use crate::mcp::CallToolResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Caller-contract violations. These propagate to the transport as protocol
/// errors; remote failures are reported inside a flagged [`CallToolResult`].
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Unknown GitHub tool: {0}")]
    UnknownGitHubTool(String),
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Every advertised tool, in a stable order: greeting first, then GitHub.
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    let mut tools = hello_world::descriptors();
    tools.extend(github::descriptors());
    tools
}

/// Route one invocation to its handler by exact name.
pub async fn call_tool(
    api: &dyn GitHubApi,
    name: &str,
    arguments: Value,
) -> Result<CallToolResult, ToolError> {
    match name {
        hello_world::HELLO_WORLD => Ok(hello_world::call_tool()),
        github::LIST_REPOSITORIES | github::GET_ASSIGNED_PULL_REQUESTS => {
            github::call_tool(api, name, arguments).await
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

// Missing or null arguments behave like an empty object.
pub(crate) fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool: &str,
    arguments: Value,
) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}
