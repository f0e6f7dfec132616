//! Decoding of inbound realtime stream frames.
//!
//! Frames are JSON objects discriminated by their `type` field. Anything
//! carrying an `error` field is reported as [`InboundFrame::Error`] whatever
//! its type, and objects without a type are replies to frames we sent.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::message::ChatMessage;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Frame is not a JSON object")]
    NotAnObject,

    #[error("Frame of type '{kind}' has an unexpected shape: {source}")]
    Shape {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Event(Event),
    /// Reply to a frame we sent, e.g. `{"ok": true, "reply_to": 1}`
    Ack { reply_to: Option<u64>, ok: bool },
    /// Frame carrying an `error` field
    Error(ErrorDetail),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: Option<i64>,
    pub msg: String,
}

impl ErrorDetail {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(msg) => Self {
                code: None,
                msg: msg.clone(),
            },
            Value::Object(map) => Self {
                code: map.get("code").and_then(Value::as_i64),
                msg: map
                    .get("msg")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            other => Self {
                code: None,
                msg: other.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "error {code}: {}", self.msg),
            None => write!(f, "error: {}", self.msg),
        }
    }
}

/// Typed events, one variant per `type` value we handle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Hello,
    Pong {
        #[serde(default)]
        reply_to: Option<u64>,
    },
    Message(MessageEvent),
    UserTyping,
    PresenceChange,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSubtype {
    MessageChanged,
    BotMessage,
    #[serde(other)]
    Other,
}

/// A `message` event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub subtype: Option<MessageSubtype>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    /// New content of an edited message
    #[serde(default)]
    pub message: Option<EditedMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EditedMessage {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl MessageEvent {
    /// The human-posted message this event carries, if any.
    ///
    /// Plain messages and edits are returned with the raw text; bot messages,
    /// other subtypes, and events missing a sender, channel, text or timestamp
    /// yield `None`. Display names are left empty.
    #[must_use]
    pub fn into_chat_message(self) -> Option<ChatMessage> {
        let (user, text, ts) = match self.subtype {
            None => (self.user?, self.text?, self.ts?),
            Some(MessageSubtype::MessageChanged) => {
                let edited = self.message?;
                (edited.user?, edited.text?, edited.ts?)
            }
            Some(MessageSubtype::BotMessage | MessageSubtype::Other) => return None,
        };

        Some(ChatMessage {
            user_id: user,
            channel_id: self.channel?,
            text,
            timestamp: ts,
            ..ChatMessage::default()
        })
    }
}

/// Decode one text frame.
///
/// # Errors
///
/// Returns a [`FrameError`] when the text isn't a JSON object, or when a
/// known event type has fields of the wrong shape.
pub fn decode_frame(text: &str) -> Result<InboundFrame, FrameError> {
    let value: Value = serde_json::from_str(text).map_err(FrameError::Malformed)?;
    if !value.is_object() {
        return Err(FrameError::NotAnObject);
    }

    if let Some(error) = value.get("error") {
        return Ok(InboundFrame::Error(ErrorDetail::from_value(error)));
    }

    let Some(kind) = value.get("type").map(type_name) else {
        return Ok(InboundFrame::Ack {
            reply_to: value.get("reply_to").and_then(Value::as_u64),
            ok: value.get("ok").and_then(Value::as_bool).unwrap_or(true),
        });
    };

    serde_json::from_value(value)
        .map(InboundFrame::Event)
        .map_err(|source| FrameError::Shape { kind, source })
}

fn type_name(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message() {
        let frame = decode_frame(
            r#"{"type": "message", "channel": "C1", "user": "U1",
                "text": "<@UBOT> jack", "ts": "1458170617.000005", "team": "T1"}"#,
        )
        .unwrap();

        let InboundFrame::Event(Event::Message(event)) = frame else {
            panic!("expected message event");
        };
        let message = event.into_chat_message().unwrap();
        assert_eq!(message.user_id, "U1");
        assert_eq!(message.channel_id, "C1");
        assert_eq!(message.text, "<@UBOT> jack");
        assert_eq!(message.timestamp, "1458170617.000005");
        assert!(message.user_name.is_empty());
    }

    #[test]
    fn test_decode_edited_message() {
        let frame = decode_frame(
            r#"{"type": "message", "subtype": "message_changed", "channel": "C1",
                "message": {"type": "message", "user": "U2", "text": "<@UBOT> cat", "ts": "12.5"},
                "ts": "13.0"}"#,
        )
        .unwrap();

        let InboundFrame::Event(Event::Message(event)) = frame else {
            panic!("expected message event");
        };
        let message = event.into_chat_message().unwrap();
        assert_eq!(message.user_id, "U2");
        assert_eq!(message.text, "<@UBOT> cat");
        assert_eq!(message.timestamp, "12.5");
    }

    #[test]
    fn test_bot_and_other_subtypes_are_skipped() {
        for subtype in ["bot_message", "channel_join"] {
            let text = format!(
                r#"{{"type": "message", "subtype": "{subtype}", "channel": "C1",
                     "text": "hi", "ts": "1.0"}}"#
            );
            let InboundFrame::Event(Event::Message(event)) = decode_frame(&text).unwrap() else {
                panic!("expected message event");
            };
            assert!(event.into_chat_message().is_none());
        }
    }

    #[test]
    fn test_decode_simple_events() {
        assert_eq!(
            decode_frame(r#"{"type": "hello"}"#).unwrap(),
            InboundFrame::Event(Event::Hello)
        );
        assert_eq!(
            decode_frame(r#"{"type": "pong", "reply_to": 3}"#).unwrap(),
            InboundFrame::Event(Event::Pong { reply_to: Some(3) })
        );
        assert_eq!(
            decode_frame(r#"{"type": "user_typing", "channel": "C1", "user": "U1"}"#).unwrap(),
            InboundFrame::Event(Event::UserTyping)
        );
        assert_eq!(
            decode_frame(r#"{"type": "reaction_added", "reaction": "+1"}"#).unwrap(),
            InboundFrame::Event(Event::Unknown)
        );
    }

    #[test]
    fn test_decode_error_frames() {
        let frame =
            decode_frame(r#"{"type": "error", "error": {"code": 1, "msg": "Socket URL has expired"}}"#)
                .unwrap();
        assert_eq!(
            frame,
            InboundFrame::Error(ErrorDetail {
                code: Some(1),
                msg: "Socket URL has expired".to_string(),
            })
        );

        let frame = decode_frame(r#"{"ok": false, "reply_to": 2, "error": "rate_limited"}"#).unwrap();
        assert!(matches!(frame, InboundFrame::Error(detail) if detail.msg == "rate_limited"));
    }

    #[test]
    fn test_decode_ack() {
        assert_eq!(
            decode_frame(r#"{"ok": true, "reply_to": 5, "ts": "1.0"}"#).unwrap(),
            InboundFrame::Ack {
                reply_to: Some(5),
                ok: true
            }
        );
    }

    #[test]
    fn test_malformed_frames() {
        assert!(matches!(
            decode_frame("not json"),
            Err(FrameError::Malformed(_))
        ));
        assert!(matches!(decode_frame("[1, 2]"), Err(FrameError::NotAnObject)));
    }

    #[test]
    fn test_wrong_shape_is_typed_error() {
        let err = decode_frame(r#"{"type": "message", "channel": "C1", "text": 42}"#).unwrap_err();
        assert!(matches!(err, FrameError::Shape { ref kind, .. } if kind == "message"));

        let err = decode_frame(r#"{"type": "pong", "reply_to": "three"}"#).unwrap_err();
        assert!(matches!(err, FrameError::Shape { ref kind, .. } if kind == "pong"));
    }
}
