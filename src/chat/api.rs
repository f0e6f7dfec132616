use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::BotConfig;
use crate::core::message::OutboundMessage;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned HTTP {0}")]
    Status(u16),

    #[error("Failed to decode API response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{method} failed: {error}")]
    Platform { method: String, error: String },
}

/// Which directory a name lookup goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    User,
    Channel,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Channel => write!(f, "channel"),
        }
    }
}

/// The chat platform's request/response API
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Start a realtime session, returning the stream URL to dial
    async fn start_session(&self) -> Result<String, ApiError>;

    /// Look up the display name of a user or channel
    async fn lookup_name(&self, kind: NameKind, id: &str) -> Result<String, ApiError>;

    /// Post one message to a channel as the bot
    async fn post_message(&self, channel: &str, message: &OutboundMessage) -> Result<(), ApiError>;
}

/// Fields every API response carries
#[derive(Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SessionStart {
    url: String,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct UserInfo {
    user: Named,
}

#[derive(Deserialize)]
struct ChannelInfo {
    channel: Named,
}

/// Web API client for Slack
#[derive(Debug, Clone)]
pub struct SlackApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
    session_method: String,
}

impl SlackApi {
    /// Build a client from the bot configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BotConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.slack_token.clone(),
            session_method: config.session_method.clone(),
        })
    }

    fn request(&self, method: &str, params: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(&self.token)
            .form(params)
    }

    /// Call an API method and decode its payload
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.request(method, params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let envelope: Envelope = serde_json::from_str(&body)?;
        if !envelope.ok {
            return Err(ApiError::Platform {
                method: method.to_string(),
                error: envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChatApi for SlackApi {
    async fn start_session(&self) -> Result<String, ApiError> {
        let start: SessionStart = self.call(&self.session_method, &[]).await?;
        Ok(start.url)
    }

    async fn lookup_name(&self, kind: NameKind, id: &str) -> Result<String, ApiError> {
        let name = match kind {
            NameKind::User => {
                let info: UserInfo = self.call("users.info", &[("user", id)]).await?;
                info.user.name
            }
            NameKind::Channel => {
                let info: ChannelInfo = self
                    .call("conversations.info", &[("channel", id)])
                    .await?;
                info.channel.name
            }
        };
        Ok(name)
    }

    async fn post_message(&self, channel: &str, message: &OutboundMessage) -> Result<(), ApiError> {
        let attachments = if message.attachments.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&message.attachments)?)
        };

        let mut params = vec![
            ("as_user", "true"),
            ("channel", channel),
            ("text", message.text.as_str()),
        ];
        if let Some(attachments) = &attachments {
            params.push(("attachments", attachments.as_str()));
        }

        let _: serde_json::Value = self.call("chat.postMessage", &params).await?;
        Ok(())
    }
}
