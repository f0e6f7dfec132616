//! Outgoing-webhook endpoint.
//!
//! The chat platform POSTs a form for every channel message that starts
//! with the configured trigger word, and posts whatever JSON message the
//! endpoint replies with.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! bits-bot serve
//!
//! # Bind to all interfaces
//! bits-bot serve --address 0.0.0.0 --port 3000
//! ```
//!
//! ## API Endpoints
//!
//! - `POST /` - Outgoing-webhook form, answered with `{"text": ..., "attachments": [...]}`

pub mod server;
