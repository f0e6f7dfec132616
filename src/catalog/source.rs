use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::debug;

use crate::catalog::store::{parse_catalog_json, CatalogError};
use crate::config::BotConfig;
use crate::core::entry::CatalogEntry;

/// Where the bot gets its image list from.
///
/// Each call returns a fresh list owned by the caller; nothing is cached
/// between requests.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the catalog. `keywords` is a hint for sources that can
    /// pre-filter; the result is always scored locally.
    async fn fetch(&self, keywords: &[String]) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// The catalog service's HTTP API
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    auth: String,
    server_search: bool,
}

impl HttpCatalog {
    /// Build a client from the bot configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BotConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.catalog_base_url.trim_end_matches('/').to_string(),
            auth: config.catalog_auth.clone(),
            server_search: config.server_search,
        })
    }

    fn request(&self, keywords: &[String]) -> reqwest::RequestBuilder {
        let request = if self.server_search {
            self.client
                .get(format!("{}/api/v1/search/all", self.base_url))
                .query(&[("q", keywords.join(" "))])
        } else {
            self.client.get(format!("{}/api/v1/all", self.base_url))
        };
        request.header(AUTHORIZATION, &self.auth)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch(&self, keywords: &[String]) -> Result<Vec<CatalogEntry>, CatalogError> {
        let response = self.request(keywords).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::StatusError(status.as_u16()));
        }

        let body = response.text().await?;
        let entries = parse_catalog_json(&body)?;
        debug!("Fetched {} catalog entries", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_catalog(server_search: bool) -> HttpCatalog {
        let mut config = BotConfig::new("t", "secret");
        config.catalog_base_url = "https://images.example.com/".to_string();
        config.server_search = server_search;
        HttpCatalog::new(&config).unwrap()
    }

    #[test]
    fn test_list_all_url() {
        let catalog = make_catalog(false);
        let request = catalog.request(&["jack".to_string()]).build().unwrap();
        assert_eq!(request.url().as_str(), "https://images.example.com/api/v1/all");
        assert_eq!(request.headers()[AUTHORIZATION], "secret");
    }

    #[test]
    fn test_search_url() {
        let catalog = make_catalog(true);
        let keywords = vec!["jack".to_string(), "laughing".to_string()];
        let request = catalog.request(&keywords).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://images.example.com/api/v1/search/all?q=jack+laughing"
        );
    }
}
