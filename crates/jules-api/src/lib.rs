//! Client-side plumbing for the Jules API.
//!
//! This crate is used by `jules-mcp` and contains everything that talks to (or shapes data for)
//! the remote API:
//! - [`config`]: base endpoint and credential, resolved once at startup
//! - [`source`]: canonicalization of user-supplied repository references
//! - [`client`]: the authenticated request executor
//! - [`render`]: conversion of decoded payloads into MCP tool content
//!
//! MCP server logic and tool argument validation live in `jules-mcp`.

pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod source;

pub use client::{JulesClient, RemoteCall};
pub use config::ApiConfig;
pub use error::{ApiError, ErrorDetail, Result};
