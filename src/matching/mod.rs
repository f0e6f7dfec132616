//! Keyword relevance matching over a fetched image catalog.
//!
//! - [`MatchingEngine`]: filters the catalog to displayable kinds and finds the winner set
//! - [`WinnerSet`]: entries tied at the best score, with a seeded tie-break
//! - [`scoring`]: the per-title relevance score
//!
//! ## Scoring
//!
//! Every query keyword must appear in the title. Each match is worth a fixed
//! bonus, gaps between consecutive matches cost points, and the running score
//! is amplified after every keyword, so titles that contain the query as a
//! phrase rank above titles that merely contain the words.
//!
//! ## Example
//!
//! ```rust
//! use bits_bot::core::CatalogEntry;
//! use bits_bot::matching::{seed_from_timestamp, MatchingEngine};
//!
//! let catalog = vec![
//!     CatalogEntry::new(1, "a", "Jack Nicholson Laughing", "jpeg"),
//!     CatalogEntry::new(2, "b", "Will Smith Laughing", "png"),
//! ];
//!
//! let engine = MatchingEngine::new(&catalog);
//! let winners = engine.find_winners_for_text("laughing");
//! assert_eq!(winners.len(), 2);
//!
//! let winner = winners.pick(seed_from_timestamp("1458170617.000005")).unwrap();
//! println!("{}", winner.title);
//! ```

pub mod engine;
pub mod scoring;

pub use engine::{seed_from_timestamp, MatchingEngine, ScoredCandidate, WinnerSet};
