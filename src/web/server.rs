use axum::{
    extract::{DefaultBodyLimit, Form, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

use crate::bot::handler::Bot;
use crate::bot::request::strip_trigger;
use crate::catalog::source::HttpCatalog;
use crate::cli::ServeArgs;
use crate::config::BotConfig;
use crate::core::message::ChatMessage;

/// Largest webhook form accepted
pub const MAX_FORM_SIZE: usize = 64 * 1024;

/// Requests handled at once
pub const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Time allowed for one request, catalog fetch included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User name the platform posts its own messages under
const PLATFORM_USER: &str = "slackbot";

/// Shared application state
pub struct AppState {
    pub bot: Bot,
    pub config: Arc<BotConfig>,
}

/// Outgoing-webhook form fields
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WebhookForm {
    pub token: String,
    pub trigger_word: String,
    pub user_id: String,
    pub user_name: String,
    pub channel_id: String,
    pub channel_name: String,
    pub text: String,
    pub timestamp: String,
}

/// Run the webhook server
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the tokio runtime
/// cannot be created or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Create the application router with all routes and middleware configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(webhook_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
                .layer(DefaultBodyLimit::max(MAX_FORM_SIZE)),
        )
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = args.bot.into_config();
    config.trigger_word = args.trigger_word;
    config.validate()?;
    let config = Arc::new(config);

    let catalog = Arc::new(HttpCatalog::new(&config)?);
    let bot = Bot::new(catalog, &config);
    let app = create_router(Arc::new(AppState { bot, config }));

    let addr = format!("{}:{}", args.address, args.port);
    info!("Starting bits-bot webhook server at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Answer one outgoing-webhook post
async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<WebhookForm>,
) -> Response {
    if form.token != state.config.slack_token {
        // Not meant for us
        return StatusCode::OK.into_response();
    }
    if form.trigger_word != state.config.trigger_word {
        return StatusCode::OK.into_response();
    }
    // Prevent echo loops
    if form.user_name == PLATFORM_USER {
        return StatusCode::OK.into_response();
    }

    let text = form.text.trim_matches(&[' ', '\t', '\n'][..]);
    info!(
        "#{} <{} ({})>: {}",
        form.channel_name, form.user_name, form.user_id, text
    );
    let text = strip_trigger(text, &state.config.trigger_word).unwrap_or(text);

    let message = ChatMessage {
        user_id: form.user_id.clone(),
        user_name: form.user_name.clone(),
        channel_id: form.channel_id.clone(),
        channel_name: form.channel_name.clone(),
        text: text.to_string(),
        timestamp: form.timestamp.clone(),
    };

    match state.bot.respond(&message).await {
        Ok(reply) => Json(reply).into_response(),
        Err(err) => {
            error!("  catalog fetch failed: {err}");
            StatusCode::OK.into_response()
        }
    }
}
