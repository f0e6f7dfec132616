//! Image catalog sources.
//!
//! The bot never keeps a catalog between requests: every inbound query
//! fetches a fresh list through a [`CatalogSource`].
//!
//! - [`HttpCatalog`]: the catalog service's HTTP API
//! - [`FileCatalog`]: a catalog saved to a JSON file (offline search, tests)
//! - [`MemoryCatalog`]: a fixed list held in memory
//!
//! ## Example
//!
//! ```rust,no_run
//! use bits_bot::catalog::{CatalogSource, FileCatalog};
//!
//! # async fn demo() -> Result<(), bits_bot::catalog::CatalogError> {
//! let catalog = FileCatalog::new("bits.json");
//! let entries = catalog.fetch(&[]).await?;
//! println!("{} images", entries.len());
//! # Ok(())
//! # }
//! ```

pub mod source;
pub mod store;

pub use source::{CatalogSource, HttpCatalog};
pub use store::{parse_catalog_json, CatalogError, FileCatalog, MemoryCatalog};
