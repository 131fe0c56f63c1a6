//! MCP tool routers, one per resource.
//!
//! Each module adds an `impl CodecksServer` block with its own named router;
//! `CodecksServer::new` adds them together.

mod account;
mod cards;
mod decks;
mod projects;

#[cfg(test)]
mod projects_test;

pub use cards::{
    CreateCardParams, DeleteCardParams, GetCardParams, ListCardsParams, UpdateCardParams,
};
pub use decks::CreateDeckParams;
