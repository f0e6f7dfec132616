use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::entry::CatalogEntry;
use crate::core::tokenize::tokenize;
use crate::matching::scoring::{score_words, BASE_SCORE};

/// One scored entry from a match pass
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    /// The scored entry
    pub entry: &'a CatalogEntry,

    /// Relevance score; higher is better
    pub score: i32,

    /// Position of the entry within the engine's filtered catalog
    pub index: usize,
}

/// Entries tied at the best score of one match pass
#[derive(Debug, Clone, Default)]
pub struct WinnerSet<'a> {
    /// Winners in catalog order
    pub entries: Vec<&'a CatalogEntry>,

    /// The winning score, or `None` for the empty query (everything wins)
    /// and for an empty set
    pub score: Option<i32>,
}

impl<'a> WinnerSet<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CatalogEntry> + '_ {
        self.entries.iter().copied()
    }

    /// Choose one winner, breaking ties uniformly at random.
    ///
    /// The generator is seeded with `seed`, so the same set and seed always
    /// produce the same choice.
    #[must_use]
    pub fn pick(&self, seed: u64) -> Option<&'a CatalogEntry> {
        match self.entries.len() {
            0 => None,
            1 => Some(self.entries[0]),
            n => {
                let mut rng = StdRng::seed_from_u64(seed);
                Some(self.entries[rng.gen_range(0..n)])
            }
        }
    }
}

/// Derive the tie-break seed from a platform timestamp such as `"1458170617.000005"`.
///
/// The timestamp is read as floating-point seconds and truncated to whole
/// seconds. Anything that doesn't parse to a finite number falls back to the
/// current wall-clock time in nanoseconds.
#[must_use]
pub fn seed_from_timestamp(timestamp: &str) -> u64 {
    match timestamp.trim().parse::<f64>() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(seconds) if seconds.is_finite() => seconds as i64 as u64,
        _ => wall_clock_seed(),
    }
}

#[allow(clippy::cast_sign_loss)]
fn wall_clock_seed() -> u64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}

/// Scores a fetched catalog against keyword queries.
///
/// Only entries that can be shown as an image attachment take part; video
/// embeds and unknown kinds are dropped when the engine is built. Titles are
/// tokenized once up front and reused across queries.
pub struct MatchingEngine<'a> {
    entries: Vec<&'a CatalogEntry>,
    title_words: Vec<Vec<String>>,
}

impl<'a> MatchingEngine<'a> {
    /// Build an engine over the displayable entries of `catalog`
    pub fn new(catalog: &'a [CatalogEntry]) -> Self {
        let entries: Vec<&CatalogEntry> = catalog
            .iter()
            .filter(|entry| entry.media_kind().is_displayable())
            .collect();
        let title_words = entries.iter().map(|entry| tokenize(&entry.title)).collect();

        Self {
            entries,
            title_words,
        }
    }

    /// Number of entries taking part in matching
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score every entry against the query.
    ///
    /// Entries missing a keyword, or scoring at or below the sentinel, are skipped.
    pub fn score_all(&self, keywords: &[String]) -> Vec<ScoredCandidate<'a>> {
        self.entries
            .iter()
            .zip(&self.title_words)
            .enumerate()
            .filter_map(|(index, (entry, words))| {
                score_words(words, keywords)
                    .filter(|&score| score > BASE_SCORE)
                    .map(|score| ScoredCandidate {
                        entry: *entry,
                        score,
                        index,
                    })
            })
            .collect()
    }

    /// Find every entry tied at the best score.
    ///
    /// The empty query matches the whole catalog.
    pub fn find_winners(&self, keywords: &[String]) -> WinnerSet<'a> {
        if keywords.is_empty() {
            return WinnerSet {
                entries: self.entries.clone(),
                score: None,
            };
        }

        let mut highest: Option<i32> = None;
        let mut winning: Vec<usize> = Vec::new();

        for candidate in self.score_all(keywords) {
            match highest {
                Some(best) if candidate.score < best => {}
                Some(best) if candidate.score == best => winning.push(candidate.index),
                _ => {
                    // New best score: start a new pool of winners
                    highest = Some(candidate.score);
                    winning.clear();
                    winning.push(candidate.index);
                }
            }
        }

        WinnerSet {
            entries: winning.into_iter().map(|idx| self.entries[idx]).collect(),
            score: highest,
        }
    }

    /// Tokenize raw query text and find its winners
    pub fn find_winners_for_text(&self, text: &str) -> WinnerSet<'a> {
        self.find_winners(&tokenize(text))
    }
}
