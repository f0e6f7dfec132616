//! The reply pipeline shared by every integration mode.
//!
//! - [`request`]: trigger stripping and `-list` detection
//! - [`reply`]: reply text, attachments and chunk splitting
//! - [`Bot`]: fetch, match and compose for one message

pub mod handler;
pub mod reply;
pub mod request;

pub use handler::Bot;
pub use request::{BotRequest, ReplyMode};
