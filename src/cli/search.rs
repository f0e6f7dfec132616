use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::bot::request::{BotRequest, ReplyMode};
use crate::catalog::store::FileCatalog;
use crate::cli::OutputFormat;
use crate::core::entry::CatalogEntry;
use crate::matching::engine::{seed_from_timestamp, MatchingEngine, WinnerSet};

#[derive(Args)]
pub struct SearchArgs {
    /// Catalog JSON file (a list of entries or a `{"result": {"list": [...]}}` document)
    #[arg(long, required = true)]
    pub catalog: PathBuf,

    /// Message timestamp used to break ties, as the bot would
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Query text, with an optional `-list` prefix
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub query: Vec<String>,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    keywords: &'a [String],
    mode: &'static str,
    searched: usize,
    score: Option<i32>,
    winners: Vec<WinnerOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pick: Option<&'a str>,
}

#[derive(Serialize)]
struct WinnerOutput<'a> {
    id: i64,
    short_id: &'a str,
    title: &'a str,
    kind: &'a str,
    image_url: &'a str,
}

impl<'a> From<&'a CatalogEntry> for WinnerOutput<'a> {
    fn from(entry: &'a CatalogEntry) -> Self {
        Self {
            id: entry.id,
            short_id: &entry.short_id,
            title: &entry.title,
            kind: &entry.kind,
            image_url: &entry.image_url,
        }
    }
}

/// Execute the search command
///
/// # Errors
///
/// Returns an error if the catalog file cannot be read or parsed.
pub fn run(args: SearchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let entries = FileCatalog::new(&args.catalog).load()?;
    let request = BotRequest::parse(&args.query.join(" "));

    let engine = MatchingEngine::new(&entries);
    let winners = engine.find_winners(&request.keywords);

    // Only single-image replies pick among ties
    let pick = match (&args.timestamp, request.mode) {
        (Some(timestamp), ReplyMode::Single) => winners
            .pick(seed_from_timestamp(timestamp))
            .map(|entry| entry.short_id.as_str()),
        _ => None,
    };

    match format {
        OutputFormat::Text => print_text_results(&request, &engine, &winners, pick, verbose),
        OutputFormat::Json => print_json_results(&request, &engine, &winners, pick)?,
        OutputFormat::Tsv => print_tsv_results(&winners),
    }

    Ok(())
}

fn print_text_results(
    request: &BotRequest,
    engine: &MatchingEngine<'_>,
    winners: &WinnerSet<'_>,
    pick: Option<&str>,
    verbose: bool,
) {
    if winners.is_empty() {
        println!("No matches for '{}'.", request.text);
        return;
    }

    match winners.score {
        Some(score) => println!(
            "{} best match(es) for '{}' (score {score}, {} searched):",
            winners.len(),
            request.text,
            engine.len()
        ),
        None => println!(
            "Empty query matches all {} displayable entries:",
            winners.len()
        ),
    }

    for entry in winners.iter() {
        let marker = if pick == Some(entry.short_id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(" {marker} {}\t{}", entry.short_id, entry.title);
        if verbose {
            println!("     kind: {}, image: {}", entry.kind, entry.image_url);
        }
    }

    if verbose && !request.keywords.is_empty() {
        println!();
        println!("Keywords: {}", request.keywords.join(", "));
        let mut scored = engine.score_all(&request.keywords);
        scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)));
        for candidate in scored.iter().take(10) {
            println!(
                "  {:>4}  {}\t{}",
                candidate.score, candidate.entry.short_id, candidate.entry.title
            );
        }
    }
}

fn print_json_results(
    request: &BotRequest,
    engine: &MatchingEngine<'_>,
    winners: &WinnerSet<'_>,
    pick: Option<&str>,
) -> anyhow::Result<()> {
    let output = SearchOutput {
        query: &request.text,
        keywords: &request.keywords,
        mode: match request.mode {
            ReplyMode::Single => "single",
            ReplyMode::List => "list",
        },
        searched: engine.len(),
        score: winners.score,
        winners: winners.iter().map(WinnerOutput::from).collect(),
        pick,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(winners: &WinnerSet<'_>) {
    println!("short_id\ttitle\tkind\tscore");
    let score = winners
        .score
        .map_or_else(|| "-".to_string(), |score| score.to_string());
    for entry in winners.iter() {
        println!("{}\t{}\t{}\t{score}", entry.short_id, entry.title, entry.kind);
    }
}
