//! Command-line interface for bits-bot.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **run**: Connect to the chat platform's realtime stream and answer mentions
//! - **serve**: Answer the platform's outgoing webhooks over HTTP
//! - **search**: Score a query against a saved catalog file
//!
//! ## Usage
//!
//! ```text
//! # Realtime bot, tokens from the environment
//! SLACK_TOKEN=xoxb-... BIT_AUTH=... BOT_USERID=U03ABCDEF bits-bot run
//!
//! # Webhook server
//! bits-bot serve --port 8080
//!
//! # Offline ranking check
//! bits-bot search --catalog bits.json jack laughing --format json
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{
    BotConfig, DEFAULT_API_BASE_URL, DEFAULT_CATALOG_BASE_URL, DEFAULT_IMAGE_BASE_URL,
    DEFAULT_TRIGGER_WORD,
};

pub mod run;
pub mod search;

#[derive(Parser)]
#[command(name = "bits-bot")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Answer chat keyword queries with the best-matching catalog image")]
#[command(
    long_about = "bits-bot listens for chat messages addressed to it, searches an image catalog for the titles that best match the message's keywords and posts the winning image back to the channel.\n\nIt can run as:\n- A realtime bot holding a websocket session to the chat platform\n- An outgoing-webhook HTTP endpoint\n- An offline search tool for checking rankings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the realtime bot
    Run(run::RunArgs),

    /// Start the outgoing-webhook server
    Serve(ServeArgs),

    /// Search a catalog file for a query
    Search(search::SearchArgs),
}

/// Settings shared by every mode that talks to the platform and catalog
#[derive(clap::Args, Debug, Clone)]
pub struct BotArgs {
    /// Chat platform API token (also the webhook verification token)
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: String,

    /// Authorization header value for the image catalog
    #[arg(long, env = "BIT_AUTH", hide_env_values = true)]
    pub bit_auth: String,

    /// Chat platform web API base URL
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_url: String,

    /// Image catalog service base URL
    #[arg(long, default_value = DEFAULT_CATALOG_BASE_URL)]
    pub catalog_url: String,

    /// Base URL prefixed to image links in replies
    #[arg(long, default_value = DEFAULT_IMAGE_BASE_URL)]
    pub image_url: String,

    /// Let the catalog service pre-filter by keyword
    #[arg(long)]
    pub server_search: bool,

    /// Maximum characters per posted message
    #[arg(long, default_value = "4000")]
    pub chunk_limit: usize,

    /// Timeout for catalog and API requests, in seconds
    #[arg(long, default_value = "30")]
    pub http_timeout: u64,
}

impl BotArgs {
    /// Build a configuration from these settings, leaving the rest at defaults
    #[must_use]
    pub fn into_config(self) -> BotConfig {
        let mut config = BotConfig::new(self.slack_token, self.bit_auth);
        config.api_base_url = self.api_url;
        config.catalog_base_url = self.catalog_url;
        config.image_base_url = self.image_url;
        config.server_search = self.server_search;
        config.chunk_limit = self.chunk_limit;
        config.http_timeout = Duration::from_secs(self.http_timeout);
        config
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub bot: BotArgs,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Trigger word the webhook is configured with
    #[arg(long, default_value = DEFAULT_TRIGGER_WORD)]
    pub trigger_word: String,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
