//! Tool dispatch: validate, plan, execute, render.

use crate::catalog;
use crate::contract::validate_arguments;
use crate::error::ToolError;
use jules_api::JulesClient;
use jules_api::render::render;
use rmcp::model::{CallToolResult, JsonObject, Tool};
use serde_json::Value;

#[derive(Clone)]
pub struct JulesTools {
    client: JulesClient,
}

impl JulesTools {
    #[must_use]
    pub fn new(client: JulesClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn list(&self) -> Vec<Tool> {
        catalog::list_tools()
    }

    /// Run one tool call.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] for unknown tools, contract violations and any failure reaching or
    /// answered by the Jules API.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ToolError> {
        let def = catalog::find(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let arguments = arguments.map_or(Value::Null, Value::Object);

        validate_arguments(def.fields, &arguments)?;
        let planned = catalog::plan(def, &arguments)?;

        let payload = self
            .client
            .execute(planned.call)
            .await?
            .or(planned.empty_response)
            .unwrap_or(Value::Null);
        Ok(render(&payload))
    }
}
