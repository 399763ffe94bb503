//! Process-wide API configuration.

use crate::error::{ApiError, Result};
use std::fmt;
use url::Url;

/// Default Jules API endpoint (v1alpha surface).
pub const DEFAULT_BASE_URL: &str = "https://jules.googleapis.com/v1alpha/";

/// Header carrying the API credential on every request.
pub const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Immutable configuration shared by every outbound call.
///
/// Resolved once at startup and injected into [`crate::JulesClient`]; nothing in this crate reads
/// the environment on its own.
#[derive(Clone)]
pub struct ApiConfig {
    base_url: Url,
    api_key: Option<String>,
}

impl ApiConfig {
    /// Build a configuration from a base URL and an optional credential.
    ///
    /// A trailing `/` is appended to the base URL when missing so relative resource paths
    /// resolve underneath it instead of replacing its last segment. Blank credentials are
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the base URL does not parse or is not `http(s)`.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let normalized = ensure_trailing_slash(base_url.trim());
        let base_url = Url::parse(&normalized).map_err(|e| {
            ApiError::Configuration(format!("Invalid API base URL '{normalized}': {e}"))
        })?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(ApiError::Configuration(format!(
                "Invalid API base URL '{normalized}': unsupported scheme '{}'",
                base_url.scheme()
            )));
        }

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Ok(Self { base_url, api_key })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Look up the credential for a call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when no credential was configured. This fails only the
    /// call that needs it, never startup.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            ApiError::Configuration(
                "Set the JULES_API_KEY environment variable before calling this tool.".to_string(),
            )
        })
    }
}

// Keep the credential out of logs and panic messages.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[must_use]
pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
