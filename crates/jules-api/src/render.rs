//! Rendering decoded API payloads as MCP tool content.

use rmcp::model::{CallToolResult, Content};
use serde_json::Value;

/// Render a payload as exactly one text block.
///
/// Strings (including non-JSON success bodies returned verbatim by the client) are passed
/// through untouched; everything else is pretty-printed JSON with the API's key order.
#[must_use]
pub fn render(payload: &Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(render_text(payload))])
}

#[must_use]
pub fn render_text(payload: &Value) -> String {
    if let Some(s) = payload.as_str() {
        s.to_string()
    } else {
        serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
    }
}
