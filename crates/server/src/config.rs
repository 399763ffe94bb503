//! Command line and environment configuration.

use crate::logging::LogFormat;
use clap::Parser;
use jules_api::ApiConfig;
use jules_api::config::DEFAULT_BASE_URL;
use std::path::PathBuf;

/// MCP server exposing the Jules API as tools over stdio.
#[derive(Debug, Clone, Parser)]
#[command(name = "jules-mcp", version, about)]
pub struct Cli {
    /// Jules API base URL.
    #[arg(long, env = "JULES_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// API key sent as `X-Goog-Api-Key`. Tools fail until one is configured.
    #[arg(long, env = "JULES_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Markdown file served as the API documentation resource instead of the bundled overview.
    #[arg(long, env = "JULES_DOCS_PATH")]
    pub docs_path: Option<PathBuf>,

    /// Log filter (`EnvFilter` syntax).
    #[arg(long, env = "JULES_MCP_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// # Errors
    ///
    /// Returns an error if the base URL is not a valid http(s) URL.
    pub fn api_config(&self) -> jules_api::Result<ApiConfig> {
        ApiConfig::new(&self.api_url, self.api_key.clone())
    }
}
