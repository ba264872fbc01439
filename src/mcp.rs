use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// One typed unit of tool output. Only text is produced by this server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn as_text(&self) -> &str {
        match self {
            Content::Text { text } => text,
        }
    }
}

// MCP tools/call result.
// - content: always a single text block so clients can render something.
// - isError: included only when true to keep payloads small.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: None,
        }
    }

    /// A reported, tool-level failure: normally shaped, flagged.
    pub fn error_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content item, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(Content::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error_flag() {
        let v = serde_json::to_value(CallToolResult::text("hi")).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"content": [{"type": "text", "text": "hi"}]})
        );
    }

    #[test]
    fn error_envelope_sets_flag() {
        let v = serde_json::to_value(CallToolResult::error_text("boom")).unwrap();
        assert_eq!(v["isError"], true);
        assert_eq!(v["content"][0]["text"], "boom");
    }
}
