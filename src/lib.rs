//! MCP server exposing a Codecks account to agent hosts.
//!
//! - **config**: CLI/environment configuration
//! - **codecks**: remote client, session context and resource mappers
//! - **mcp**: the tool registrar served over stdio

pub mod codecks;
pub mod config;
pub mod mcp;
