//! The API documentation resource.

use rmcp::ErrorData as McpError;
use rmcp::model::{Annotated, RawResource, ReadResourceResult, Resource, ResourceContents};
use serde_json::json;
use std::path::PathBuf;

pub const DOCS_URI: &str = "jules-doc://spec";
pub const DOCS_NAME: &str = "jules-api-docs";
const DOCS_TITLE: &str = "Jules API Overview";
const DOCS_DESCRIPTION: &str =
    "Summary of key concepts and endpoints from the Jules API documentation.";
const DOCS_MIME_TYPE: &str = "text/markdown";

/// The overview shipped inside the binary.
pub const BUNDLED_DOCS: &str = include_str!("../../../docs/jules-api.md");

/// Serves the API overview: the bundled copy, or a markdown file read on every request so edits
/// show up without a restart.
#[derive(Debug, Clone)]
pub struct DocsResource {
    path: Option<PathBuf>,
}

impl DocsResource {
    #[must_use]
    pub fn bundled() -> Self {
        Self { path: None }
    }

    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    #[must_use]
    pub fn list(&self) -> Vec<Resource> {
        let mut raw = RawResource::new(DOCS_URI, DOCS_NAME);
        raw.title = Some(DOCS_TITLE.to_string());
        raw.description = Some(DOCS_DESCRIPTION.to_string());
        raw.mime_type = Some(DOCS_MIME_TYPE.to_string());
        vec![Annotated::new(raw, None)]
    }

    /// # Errors
    ///
    /// `resource_not_found` for any URI other than [`DOCS_URI`]; an internal error naming the
    /// path if the file cannot be read.
    pub async fn read(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        if uri != DOCS_URI {
            return Err(McpError::resource_not_found(
                format!("unknown resource: {uri}"),
                Some(json!({ "uri": uri })),
            ));
        }

        let text = match &self.path {
            None => BUNDLED_DOCS.to_string(),
            Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                McpError::internal_error(format!("failed to read {}: {e}", path.display()), None)
            })?,
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}
