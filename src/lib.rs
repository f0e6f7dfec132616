//! # bits-bot
//!
//! A chat bot that answers keyword queries with the best-matching image from
//! an image catalog.
//!
//! Users address the bot in a channel (`@bitsbot jack laughing`). The bot
//! fetches the catalog, scores every title against the query's keywords and
//! posts the winning image back, picking at random among ties. A `-list`
//! prefix asks for every best match as a list of links instead.
//!
//! ## Features
//!
//! - **Phrase-aware ranking**: titles containing the query as a phrase beat
//!   titles that merely contain its words
//! - **Reproducible tie-breaks**: ties are broken by a generator seeded from
//!   the message timestamp
//! - **Resilient realtime session**: the websocket session is probed for
//!   liveness and redialed with exponential backoff
//! - **Webhook mode**: the same pipeline behind an outgoing-webhook endpoint
//!
//! ## Example
//!
//! ```rust
//! use bits_bot::{CatalogEntry, MatchingEngine};
//!
//! let catalog = vec![
//!     CatalogEntry::new(1, "x1", "Jack Nicholson laughing", "gif"),
//!     CatalogEntry::new(2, "x2", "Crowd laughing", "jpeg"),
//! ];
//!
//! let engine = MatchingEngine::new(&catalog);
//! let winners = engine.find_winners_for_text("jack laughing");
//! assert_eq!(winners.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Catalog entries, chat messages and the tokenizer
//! - [`matching`]: Relevance scoring and winner selection
//! - [`catalog`]: Catalog sources (HTTP service, JSON file, memory)
//! - [`bot`]: The reply pipeline shared by every mode
//! - [`chat`]: Chat platform API, frame decoding and the realtime session
//! - [`config`]: Runtime configuration
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Outgoing-webhook server

pub mod bot;
pub mod catalog;
pub mod chat;
pub mod cli;
pub mod config;
pub mod core;
pub mod matching;
pub mod web;

// Re-export commonly used types for convenience
pub use bot::handler::Bot;
pub use catalog::source::{CatalogSource, HttpCatalog};
pub use catalog::store::{CatalogError, FileCatalog, MemoryCatalog};
pub use chat::supervisor::Supervisor;
pub use config::BotConfig;
pub use core::entry::{CatalogEntry, MediaKind};
pub use core::message::{ChatMessage, OutboundMessage};
pub use matching::engine::{MatchingEngine, WinnerSet};
