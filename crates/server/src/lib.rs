//! `jules-mcp`: a Model Context Protocol server over stdio that exposes the Jules API as tools.
//!
//! - [`catalog`]: the six tools, their argument contracts and request planning.
//! - [`tools`]: dispatch (validate, plan, execute, render).
//! - [`server`]: the `rmcp` handler, including the API docs resource.

pub mod catalog;
pub mod config;
pub mod contract;
pub mod error;
pub mod logging;
pub mod resources;
pub mod server;
pub mod tools;

pub use config::Cli;
pub use error::{ToolError, ValidationError, Violation};
pub use server::JulesMcpServer;
