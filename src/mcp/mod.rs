//! Model Context Protocol (MCP) server.
//!
//! - **server**: `CodecksServer`, the tool registrar and reply conversion
//! - **tools**: one tool router per resource (account, decks, cards, projects),
//!   combined into the server's router

pub mod server;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;


pub use server::CodecksServer;
