//! Error types for the MCP server.

use jules_api::ApiError;
use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One problem found in a tool's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub parameter: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Violation {
    #[must_use]
    pub fn missing(parameter: &str) -> Self {
        Self {
            kind: "missing-required-parameter",
            parameter: parameter.to_string(),
            message: format!("{parameter} is required"),
            suggestions: Vec::new(),
        }
    }

    #[must_use]
    pub fn unknown(parameter: &str, suggestions: Vec<String>) -> Self {
        let message = match suggestions.first() {
            Some(s) => format!("unknown parameter '{parameter}' (did you mean '{s}'?)"),
            None => format!("unknown parameter '{parameter}'"),
        };
        Self {
            kind: "invalid-parameter",
            parameter: parameter.to_string(),
            message,
            suggestions,
        }
    }

    #[must_use]
    pub fn constraint(parameter: &str, message: String) -> Self {
        Self {
            kind: "constraint-violation",
            parameter: parameter.to_string(),
            message,
            suggestions: Vec::new(),
        }
    }
}

/// Tool arguments violate the tool's declared contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid params: {}", summary(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    #[must_use]
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

fn summary(violations: &[Violation]) -> String {
    match violations {
        [only] => only.message.clone(),
        many => format!(
            "validation failed with {} error(s): {}",
            many.len(),
            many.iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

/// Main error type for tool calls.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for ToolError {
    fn from(value: ApiError) -> Self {
        match value {
            // Only source normalization raises this; the caller's input is at fault.
            ApiError::InvalidArgument(message) => {
                Self::Validation(ValidationError::new(vec![Violation::constraint(
                    "source", message,
                )]))
            }
            other => Self::Api(other),
        }
    }
}

impl ToolError {
    /// Map to the MCP boundary.
    ///
    /// Contract problems become protocol errors (`invalid_params`). Configuration, remote and
    /// transport failures become a tool result flagged `isError` so the model sees the message.
    ///
    /// # Errors
    ///
    /// Returns the protocol error for validation and unknown-tool failures.
    pub fn into_call_result(self) -> Result<CallToolResult, McpError> {
        match self {
            Self::Validation(e) => {
                let data = json!({
                    "type": "validation-errors",
                    "violations": e.violations,
                });
                Err(McpError::invalid_params(e.to_string(), Some(data)))
            }
            Self::UnknownTool(_) => Err(McpError::invalid_params(self.to_string(), None)),
            Self::Api(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jules_api::ErrorDetail;

    #[test]
    fn single_violation_message_is_used_verbatim() {
        let e = ValidationError::new(vec![Violation::missing("prompt")]);
        assert_eq!(e.to_string(), "Invalid params: prompt is required");
    }

    #[test]
    fn multiple_violations_are_summarized() {
        let e = ValidationError::new(vec![
            Violation::missing("prompt"),
            Violation::unknown("pagesize", vec!["pageSize".to_string()]),
        ]);
        let msg = e.to_string();
        assert!(msg.contains("2 error(s)"), "{msg}");
        assert!(msg.contains("did you mean 'pageSize'?"), "{msg}");
    }

    #[test]
    fn invalid_argument_from_the_api_layer_is_a_validation_error() {
        let e = ToolError::from(ApiError::InvalidArgument("source is required".to_string()));
        let ToolError::Validation(v) = e else {
            panic!("expected validation error");
        };
        assert_eq!(v.violations[0].parameter, "source");
    }

    #[test]
    fn request_building_failures_stay_api_errors() {
        let e = ToolError::from(ApiError::InvalidRequest("path 'x': bad".to_string()));
        assert!(matches!(e, ToolError::Api(ApiError::InvalidRequest(_))));
        let result = e.into_call_result().expect("tool result");
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn missing_credential_message_is_shown_verbatim() {
        let e = ToolError::from(ApiError::Configuration(
            "Set the JULES_API_KEY environment variable before calling this tool.".to_string(),
        ));
        let result = e.into_call_result().expect("tool result");
        let v = serde_json::to_value(&result).expect("serializes");
        assert_eq!(
            v["content"][0]["text"],
            "Set the JULES_API_KEY environment variable before calling this tool."
        );
    }

    #[test]
    fn validation_errors_map_to_invalid_params() {
        let e = ToolError::from(ValidationError::new(vec![Violation::missing("sessionId")]));
        let err = e.into_call_result().unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        let data = err.data.expect("violation data");
        assert_eq!(data["violations"][0]["type"], "missing-required-parameter");
        assert_eq!(data["violations"][0]["parameter"], "sessionId");
    }

    #[test]
    fn remote_errors_map_to_error_tool_results() {
        let e = ToolError::from(ApiError::Remote {
            status: 404,
            status_text: "Not Found".to_string(),
            detail: ErrorDetail::Text("gone".to_string()),
        });
        let result = e.into_call_result().expect("tool result");
        assert_eq!(result.is_error, Some(true));
        let v = serde_json::to_value(&result).expect("serializes");
        assert_eq!(v["content"][0]["text"], "Jules API 404 Not Found: gone");
    }
}
