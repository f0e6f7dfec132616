use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::source::CatalogSource;
use crate::core::entry::CatalogEntry;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Catalog request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Catalog returned HTTP {0}")]
    StatusError(u16),
}

/// Response envelope of the catalog API: `{"result": {"list": [...]}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    pub result: CatalogResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogResult {
    #[serde(default)]
    pub list: Vec<CatalogEntry>,
}

/// Either the API envelope or a bare list, as saved by hand or by older tooling
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<CatalogEntry>),
    Envelope(CatalogData),
}

/// Parse catalog entries from JSON
///
/// # Errors
///
/// Returns [`CatalogError::ParseError`] if the text is neither an entry list
/// nor the API envelope.
pub fn parse_catalog_json(json: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let document: CatalogDocument = serde_json::from_str(json)?;
    Ok(match document {
        CatalogDocument::List(list) => list,
        CatalogDocument::Envelope(data) => data.result.list,
    })
}

/// Catalog saved to a local JSON file.
///
/// The file is re-read on every fetch.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load entries synchronously, for command-line use
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let content = std::fs::read_to_string(&self.path)?;
        parse_catalog_json(&content)
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn fetch(&self, _keywords: &[String]) -> Result<Vec<CatalogEntry>, CatalogError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_catalog_json(&content)
    }
}

/// Fixed in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    entries: Vec<CatalogEntry>,
}

impl MemoryCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn fetch(&self, _keywords: &[String]) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self.entries.clone())
    }
}
