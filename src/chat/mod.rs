//! Chat platform integration for realtime mode.
//!
//! - [`api`]: the platform's web API (session start, directory, posting)
//! - [`frames`]: decoding of inbound stream frames
//! - [`names`]: per-session user and channel name cache
//! - [`backoff`]: reconnect delays
//! - [`supervisor`]: the session lifecycle

pub mod api;
pub mod backoff;
pub mod frames;
pub mod names;
pub mod supervisor;

pub use api::{ApiError, ChatApi, NameKind, SlackApi};
pub use frames::{decode_frame, Event, FrameError, InboundFrame};
pub use names::NameCache;
pub use supervisor::{SessionError, SessionPhase, Supervisor};
