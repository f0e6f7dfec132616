//! Realtime session supervision.
//!
//! The [`Supervisor`] keeps exactly one realtime session alive:
//!
//! ```text
//! Disconnected -> Handshaking -> Connected -> Closing -> Disconnected -> ...
//! ```
//!
//! While connected, a prober task pings the stream on a fixed interval and a
//! reader task decodes inbound frames. Messages addressed to the bot go onto
//! a bounded queue served by a small worker pool, so a slow reply never holds
//! up the reader. The first task to hit a transport error fires the session's
//! termination signal; the other task exits, the session's name cache and
//! queue are dropped, and the supervisor dials again.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::bot::handler::Bot;
use crate::bot::reply::split_outbound;
use crate::bot::request::strip_trigger;
use crate::chat::api::{ApiError, ChatApi, NameKind};
use crate::chat::backoff::Backoff;
use crate::chat::frames::{decode_frame, Event, FrameError, InboundFrame};
use crate::chat::names::NameCache;
use crate::config::BotConfig;
use crate::core::message::ChatMessage;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session start failed: {0}")]
    Handshake(#[from] ApiError),

    #[error("Failed to dial realtime stream: {0}")]
    Dial(#[source] tungstenite::Error),

    #[error("Stream read failed: {0}")]
    Read(#[source] tungstenite::Error),

    #[error("Stream send failed: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("Undecodable frame: {0}")]
    Frame(#[from] FrameError),

    #[error("Failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Stream closed by remote")]
    Closed,

    #[error("Session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Where the supervisor is in the connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Handshaking,
    Connected,
    Closing,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Handshaking => write!(f, "handshaking"),
            Self::Connected => write!(f, "connected"),
            Self::Closing => write!(f, "closing"),
        }
    }
}

/// Liveness probe frame
#[derive(Serialize)]
struct Probe {
    id: u64,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Write half of the stream, shared by every task that sends
#[derive(Clone)]
struct SessionSink {
    inner: Arc<Mutex<SplitSink<WsStream, Message>>>,
}

impl SessionSink {
    fn new(sink: SplitSink<WsStream, Message>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    async fn send_json<T: Serialize>(&self, frame: &T) -> Result<(), SessionError> {
        let text = serde_json::to_string(frame).map_err(SessionError::Encode)?;
        self.inner
            .lock()
            .await
            .send(Message::Text(text))
            .await
            .map_err(SessionError::Send)
    }

    async fn close(&self) {
        if let Err(err) = self.inner.lock().await.close().await {
            debug!("Error closing stream: {err}");
        }
    }
}

/// One-shot signal shared by the prober and the reader
#[derive(Clone)]
struct Termination {
    tx: Arc<watch::Sender<bool>>,
}

impl Termination {
    fn new() -> Self {
        Self {
            tx: Arc::new(watch::channel(false).0),
        }
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    fn fire(&self) {
        self.tx.send_replace(true);
    }
}

/// Handles one accepted message: resolve names, reply, post
struct Responder {
    api: Arc<dyn ChatApi>,
    bot: Arc<Bot>,
    names: Arc<NameCache>,
    chunk_limit: usize,
}

impl Responder {
    async fn handle(&self, mut message: ChatMessage) {
        message.user_name = self.names.resolve(NameKind::User, &message.user_id).await;
        message.channel_name = self
            .names
            .resolve(NameKind::Channel, &message.channel_id)
            .await;

        info!(
            "#{} ({}) <{} ({})>: {}",
            message.channel_name, message.channel_id, message.user_name, message.user_id, message.text
        );

        let reply = match self.bot.respond(&message).await {
            Ok(reply) => reply,
            Err(err) => {
                error!("  catalog fetch failed: {err}");
                return;
            }
        };

        for piece in split_outbound(&reply, self.chunk_limit) {
            if let Err(err) = self.api.post_message(&message.channel_id, &piece).await {
                error!("  post failed: {err}");
                break;
            }
        }
    }
}

/// Start `workers` tasks draining a queue of `capacity` messages.
///
/// The workers exit once the returned sender is dropped and the queue is empty.
fn spawn_workers(
    responder: Arc<Responder>,
    workers: usize,
    capacity: usize,
) -> mpsc::Sender<ChatMessage> {
    let (tx, rx) = mpsc::channel::<ChatMessage>(capacity);
    let rx = Arc::new(Mutex::new(rx));

    for worker in 0..workers {
        let rx = rx.clone();
        let responder = responder.clone();
        tokio::spawn(async move {
            loop {
                let next = rx.lock().await.recv().await;
                let Some(message) = next else { break };
                responder.handle(message).await;
            }
            debug!("  worker {worker}: dying");
        });
    }

    tx
}

/// Keeps the bot connected to the realtime stream
pub struct Supervisor {
    config: Arc<BotConfig>,
    api: Arc<dyn ChatApi>,
    bot: Arc<Bot>,
    phase: watch::Sender<SessionPhase>,
}

impl Supervisor {
    pub fn new(config: Arc<BotConfig>, api: Arc<dyn ChatApi>, bot: Arc<Bot>) -> Self {
        Self {
            config,
            api,
            bot,
            phase: watch::channel(SessionPhase::Disconnected).0,
        }
    }

    /// Follow lifecycle transitions
    pub fn phases(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: SessionPhase) {
        debug!("Session phase: {phase}");
        self.phase.send_replace(phase);
    }

    /// Connect, serve, and reconnect forever
    pub async fn run(&self) {
        let mut backoff = Backoff::new(self.config.retry);

        loop {
            match self.connect().await {
                Ok(stream) => {
                    backoff.reset();
                    let cause = self.serve_session(stream).await;
                    warn!("Session ended: {cause}");
                }
                Err(err) => warn!("{err}"),
            }

            self.enter(SessionPhase::Disconnected);
            let delay = backoff.next_delay();
            debug!("Reconnecting in {delay:?}");
            tokio::time::sleep(delay).await;
        }
    }

    /// Request a session and dial its stream
    async fn connect(&self) -> Result<WsStream, SessionError> {
        self.enter(SessionPhase::Handshaking);

        info!("Starting session with {}...", self.config.session_method);
        let url = self.api.start_session().await?;

        info!("Dialing websocket '{url}'...");
        let (stream, _) = connect_async(url).await.map_err(SessionError::Dial)?;

        info!("Connected to websocket.");
        Ok(stream)
    }

    /// Run the prober and reader until one of them fails, returning the cause
    async fn serve_session(&self, stream: WsStream) -> SessionError {
        self.enter(SessionPhase::Connected);

        let (sink, source) = stream.split();
        let sink = SessionSink::new(sink);
        let termination = Termination::new();

        let names = Arc::new(NameCache::new(self.api.clone()));
        let responder = Arc::new(Responder {
            api: self.api.clone(),
            bot: self.bot.clone(),
            names,
            chunk_limit: self.config.chunk_limit,
        });
        let queue = spawn_workers(
            responder,
            self.config.workers,
            self.config.queue_capacity,
        );

        let prober = tokio::spawn(probe(
            sink.clone(),
            self.config.probe_interval,
            termination.clone(),
        ));
        let reader = tokio::spawn(read_frames(
            source,
            queue,
            self.config.bot_tag(),
            self.config.bot_user_id.clone(),
            termination.clone(),
        ));

        let (probed, read) = tokio::join!(prober, reader);

        self.enter(SessionPhase::Closing);
        sink.close().await;

        match (read, probed) {
            (Ok(Err(err)), _) | (_, Ok(Err(err))) => err,
            (Err(err), _) | (_, Err(err)) => SessionError::Task(err),
            (Ok(Ok(())), Ok(Ok(()))) => SessionError::Closed,
        }
    }
}

/// Send a probe right away, then on every interval
async fn probe(
    sink: SessionSink,
    interval: Duration,
    termination: Termination,
) -> Result<(), SessionError> {
    let mut shutdown = termination.subscribe();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut next_id = 1u64;

    let result = loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = Probe { id: next_id, kind: "ping" };
                if let Err(err) = sink.send_json(&frame).await {
                    break Err(err);
                }
                next_id += 1;
            }
            _ = shutdown.changed() => break Ok(()),
        }
    };

    if result.is_err() {
        termination.fire();
    }
    debug!("  prober: dying");
    result
}

/// Receive frames until the stream fails or the session is torn down
async fn read_frames(
    mut source: SplitStream<WsStream>,
    queue: mpsc::Sender<ChatMessage>,
    bot_tag: String,
    bot_user_id: String,
    termination: Termination,
) -> Result<(), SessionError> {
    let mut shutdown = termination.subscribe();

    let result = loop {
        let frame = tokio::select! {
            frame = source.next() => frame,
            _ = shutdown.changed() => break Ok(()),
        };

        let handled = match frame {
            None => Err(SessionError::Closed),
            Some(Err(err)) => Err(SessionError::Read(err)),
            Some(Ok(Message::Text(text))) => {
                handle_text(&text, &queue, &bot_tag, &bot_user_id)
            }
            Some(Ok(Message::Close(frame))) => {
                debug!("  incoming: close frame {frame:?}");
                Err(SessionError::Closed)
            }
            Some(Ok(_)) => Ok(()),
        };

        if let Err(err) = handled {
            break Err(err);
        }
    };

    if result.is_err() {
        termination.fire();
    }
    debug!("  incoming: dying");
    result
}

/// Decode and route one text frame
fn handle_text(
    text: &str,
    queue: &mpsc::Sender<ChatMessage>,
    bot_tag: &str,
    bot_user_id: &str,
) -> Result<(), SessionError> {
    match decode_frame(text)? {
        InboundFrame::Error(detail) => warn!("  incoming: {detail}"),
        InboundFrame::Ack { reply_to, ok } => debug!("  incoming: ack {reply_to:?} ok={ok}"),
        InboundFrame::Event(Event::Message(event)) => {
            if let Some(message) = event.into_chat_message() {
                accept_message(message, queue, bot_tag, bot_user_id);
            }
        }
        InboundFrame::Event(Event::Hello) => info!("  incoming: hello"),
        InboundFrame::Event(Event::Pong { .. } | Event::UserTyping | Event::PresenceChange) => {}
        InboundFrame::Event(Event::Unknown) => debug!("  incoming: {text}"),
    }
    Ok(())
}

/// Queue a message if it is addressed to the bot
fn accept_message(
    mut message: ChatMessage,
    queue: &mpsc::Sender<ChatMessage>,
    bot_tag: &str,
    bot_user_id: &str,
) {
    if message.user_id == bot_user_id {
        return;
    }
    let Some(text) = strip_trigger(&message.text, bot_tag) else {
        return;
    };
    message.text = text.to_string();

    match queue.try_send(message) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(message)) => {
            warn!(
                "  incoming: reply queue full, dropping message from {}",
                message.user_id
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            warn!("  incoming: reply queue closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::Receiver<ChatMessage>) -> Vec<ChatMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    fn message_frame(user: &str, text: &str) -> String {
        serde_json::json!({
            "type": "message",
            "channel": "C1",
            "user": user,
            "text": text,
            "ts": "1458170617.000005",
        })
        .to_string()
    }

    #[test]
    fn test_addressed_message_is_queued() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_text(&message_frame("U1", "<@UBOT>: jack"), &tx, "<@UBOT>", "UBOT").unwrap();

        let queued = drain(&mut rx);
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].text, "jack");
        assert_eq!(queued[0].user_id, "U1");
        assert_eq!(queued[0].channel_id, "C1");
    }

    #[test]
    fn test_unaddressed_message_is_ignored() {
        let (tx, mut rx) = mpsc::channel(4);
        handle_text(&message_frame("U1", "jack"), &tx, "<@UBOT>", "UBOT").unwrap();
        handle_text(&message_frame("UBOT", "<@UBOT> jack"), &tx, "<@UBOT>", "UBOT").unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_error_frames_are_not_fatal() {
        let (tx, _rx) = mpsc::channel(4);
        let frame = r#"{"type": "error", "error": {"code": 2, "msg": "message text is missing"}}"#;
        assert!(handle_text(frame, &tx, "<@UBOT>", "UBOT").is_ok());
        assert!(handle_text(r#"{"type": "presence_change"}"#, &tx, "<@UBOT>", "UBOT").is_ok());
    }

    #[test]
    fn test_malformed_frame_is_fatal() {
        let (tx, _rx) = mpsc::channel(4);
        assert!(matches!(
            handle_text("{oops", &tx, "<@UBOT>", "UBOT"),
            Err(SessionError::Frame(FrameError::Malformed(_)))
        ));
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        for _ in 0..3 {
            handle_text(&message_frame("U1", "<@UBOT> jack"), &tx, "<@UBOT>", "UBOT").unwrap();
        }
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn test_probe_frame_shape() {
        let frame = Probe { id: 3, kind: "ping" };
        assert_eq!(
            serde_json::to_string(&frame).unwrap(),
            r#"{"id":3,"type":"ping"}"#
        );
    }

    #[tokio::test]
    async fn test_termination_wakes_subscribers() {
        let termination = Termination::new();
        let mut rx = termination.subscribe();
        termination.fire();
        assert!(rx.changed().await.is_ok());
        assert!(*rx.borrow());
    }
}
