use std::sync::Arc;

use tracing::{debug, info};

use crate::bot::reply::{compose_list, compose_no_match, compose_single};
use crate::bot::request::{BotRequest, ReplyMode};
use crate::catalog::source::CatalogSource;
use crate::catalog::store::CatalogError;
use crate::config::BotConfig;
use crate::core::entry::CatalogEntry;
use crate::core::message::{ChatMessage, OutboundMessage};
use crate::matching::engine::{seed_from_timestamp, MatchingEngine};

/// The reply pipeline: parse the query, fetch the catalog, match, compose.
///
/// Shared by the realtime session and the webhook server.
pub struct Bot {
    catalog: Arc<dyn CatalogSource>,
    image_base_url: String,
}

impl Bot {
    pub fn new(catalog: Arc<dyn CatalogSource>, config: &BotConfig) -> Self {
        Self {
            catalog,
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Answer one message addressed to the bot.
    ///
    /// # Errors
    ///
    /// Returns the catalog error if the image list could not be fetched.
    pub async fn respond(&self, message: &ChatMessage) -> Result<OutboundMessage, CatalogError> {
        let request = BotRequest::parse(&message.text);
        let entries = self.catalog.fetch(&request.keywords).await?;
        Ok(self.compose(message, &request, &entries))
    }

    /// Match a parsed request against already-fetched entries
    pub fn compose(
        &self,
        message: &ChatMessage,
        request: &BotRequest,
        entries: &[CatalogEntry],
    ) -> OutboundMessage {
        let engine = MatchingEngine::new(entries);
        let winners = engine.find_winners(&request.keywords);

        if request.mode == ReplyMode::List {
            return compose_list(&winners, &request.text, &self.image_base_url);
        }

        if winners.len() > 1 {
            info!("  {} winners; randomly selecting a winner", winners.len());
            for entry in winners.iter() {
                debug!("    {}: {}", entry.short_id, entry.title);
            }
        }

        match winners.pick(seed_from_timestamp(&message.timestamp)) {
            Some(entry) => {
                info!("  winner: {}: {}", entry.short_id, entry.title);
                compose_single(entry, &self.image_base_url)
            }
            None => {
                info!("  No match!");
                compose_no_match(&message.user_name, &request.text)
            }
        }
    }
}
