use super::ToolDescriptor;
use crate::mcp::CallToolResult;

pub const HELLO_WORLD: &str = "hello_world";

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![ToolDescriptor {
        name: HELLO_WORLD.into(),
        description: "Returns a simple Hello, World! message".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }]
}

pub fn call_tool() -> CallToolResult {
    CallToolResult::text("Hello, World!")
}
