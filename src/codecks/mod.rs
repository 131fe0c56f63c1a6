//! Codecks API integration.
//!
//! - **client**: the single remote call primitive (query or dispatch)
//! - **context**: session state discovered at startup
//! - **startup**: the startup protocol that seeds the context
//! - **account**, **decks**, **cards**, **spaces**: per-resource mappers owning
//!   the query shapes and the graph-to-record transformation
//! - **validation**: metadata-derived field rules

pub mod account;
pub mod cards;
pub mod client;
pub mod context;
pub mod decks;
pub mod entities;
pub mod error;
pub mod spaces;
pub mod startup;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_server;

#[cfg(test)]
mod client_test;

pub use client::{CallMode, CodecksClient};
pub use context::{Session, SessionContext};
pub use entities::{Account, Card, CardStatus, CardType, Deck, Metadata, Space, Visibility};
pub use error::{CodecksError, CodecksResult};
pub use startup::bootstrap;
