//! Core data types shared by the matcher, the chat session and the webhook.
//!
//! - [`CatalogEntry`]: one image record fetched from the catalog
//! - [`MediaKind`]: classification of an entry's `kind` string
//! - [`ChatMessage`] / [`OutboundMessage`]: normalized inbound and outbound messages
//! - [`tokenize`]: the word splitter used for both queries and titles

pub mod entry;
pub mod message;
pub mod tokenize;

pub use entry::{CatalogEntry, MediaKind};
pub use message::{Attachment, ChatMessage, OutboundMessage};
pub use tokenize::tokenize;
