//! Browse a listing catalog from the command line.
//!
//! Loads both collections from a catalog directory, applies the query flags,
//! and prints the facets plus the visible listings for the chosen tab.
//!
//! Usage:
//!   catalog-browse --tab agents --category support --search bot
//!   catalog-browse --root data --sort rating --view list
//!   catalog-browse --json | jq '.visible.items[].slug'
//!
//! Exit codes: 0 when both collections loaded, 2 when a load failed after all
//! retries (whatever data did load is still printed), 1 for usage or setup
//! errors.

use anyhow::{Context, Result};
use clap::Parser;
use listing_catalog::runtime::{env_flag, init_logging};
use listing_catalog::schema::listing_schema_version;
use listing_catalog::{
    CatalogSnapshot, Collection, DirectorySource, ListingClient, LoadStatus, Marketplace,
    QueryState, SortKey, ViewMode, VisibleListings, find_catalog_root,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "catalog-browse")]
#[command(about = "Filter and sort agent/chatflow listings from a catalog directory")]
struct Cli {
    /// Catalog directory holding agents.json and chatflows.json.
    #[arg(long)]
    root: Option<PathBuf>,
    /// Collection to show.
    #[arg(long, default_value = "agents", value_parser = ["agents", "chatflows"])]
    tab: String,
    /// Category facet to filter by ("all" disables the filter).
    #[arg(long, default_value = "all")]
    category: String,
    /// Case-insensitive text matched against name, description, and capabilities.
    #[arg(long, default_value = "")]
    search: String,
    /// Sort criterion: featured, rating, or newest. Unknown values keep input order.
    #[arg(long, default_value = "featured")]
    sort: String,
    /// Output layout for human-readable mode.
    #[arg(long, default_value = "grid", value_parser = ["grid", "list"])]
    view: String,
    /// Retry this many times when a collection fails to load.
    #[arg(long, default_value_t = 0)]
    retries: u32,
    /// Emit a single JSON document instead of text.
    #[arg(long)]
    json: bool,
    /// Debug logging for this crate (RUST_LOG overrides).
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose || env_flag("LISTING_CATALOG_VERBOSE"));

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => find_catalog_root().context("locating catalog directory")?,
    };
    let query = query_from_cli(&cli)?;
    let market = Marketplace::with_query(
        ListingClient::from_source(DirectorySource::new(&root)),
        query,
    );

    market.load().wait();
    for attempt in 1..=cli.retries {
        if market.load_status() != LoadStatus::Error {
            break;
        }
        tracing::info!(attempt, "retrying catalog load");
        market.retry().wait();
    }

    let snapshot = market.snapshot();
    let query = market.query();
    if cli.category != listing_catalog::ALL_FACET && !snapshot.facets.contains(&query.category) {
        tracing::warn!(category = %query.category, "category is not a known facet");
    }

    if cli.json {
        let document = json!({
            "schema_version": listing_schema_version()?,
            "root": root.display().to_string(),
            "status": snapshot.status(),
            "error": snapshot.error_message,
            "stale": snapshot.is_stale(),
            "facets": snapshot.facets,
            "query": query,
            "visible": snapshot.select(query),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print_human(&snapshot, query);
    }

    if snapshot.status() == LoadStatus::Error {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn query_from_cli(cli: &Cli) -> Result<QueryState> {
    let tab = Collection::parse(&cli.tab)
        .with_context(|| format!("unknown tab '{}'", cli.tab))?;
    let view_mode = match cli.view.as_str() {
        "list" => ViewMode::List,
        _ => ViewMode::Grid,
    };
    Ok(QueryState {
        tab,
        // Facets are lower-case; accept any casing on the command line.
        category: cli.category.trim().to_lowercase(),
        search_text: cli.search.clone(),
        sort: SortKey::parse(&cli.sort),
        view_mode,
    })
}

fn print_human(snapshot: &CatalogSnapshot, query: &QueryState) {

    println!("facets: {}", snapshot.facets.iter().collect::<Vec<_>>().join(", "));
    println!("status: {:?}", snapshot.status());
    if let Some(message) = &snapshot.error_message {
        eprintln!("error: {message}");
        if snapshot.is_stale() {
            eprintln!("note: showing data from the last successful load");
        }
    }

    let visible = snapshot.select(query);
    println!(
        "{} ({}), sorted by {}",
        visible.collection(),
        visible.len(),
        query.sort.as_str()
    );
    if visible.is_empty() {
        println!("  no listings match; clear the category and search to see everything");
        return;
    }

    let rows: Vec<Row> = match &visible {
        VisibleListings::Agents(items) => items
            .iter()
            .map(|a| Row {
                slug: &a.slug,
                name: &a.name,
                category: &a.category,
                description: &a.description,
                rating: a.metadata.rating,
                badges: badges(a.metadata.featured, a.metadata.is_new, a.metadata.popular),
            })
            .collect(),
        VisibleListings::Chatflows(items) => items
            .iter()
            .map(|c| Row {
                slug: &c.slug,
                name: &c.name,
                category: &c.category,
                description: &c.description,
                rating: c.metadata.rating,
                badges: badges(c.metadata.featured, c.metadata.is_new, c.metadata.popular),
            })
            .collect(),
    };

    for row in rows {
        let rating = row
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        match query.view_mode {
            ViewMode::Grid => println!(
                "  {:<24} {:<16} {:>4}  {}",
                row.slug, row.category, rating, row.badges
            ),
            ViewMode::List => {
                println!("  {} [{}] rating {} {}", row.name, row.category, rating, row.badges);
                if !row.description.is_empty() {
                    println!("      {}", row.description);
                }
            }
        }
    }
}

struct Row<'a> {
    slug: &'a str,
    name: &'a str,
    category: &'a str,
    description: &'a str,
    rating: Option<f64>,
    badges: String,
}

fn badges(featured: bool, new: bool, popular: bool) -> String {
    [(featured, "featured"), (new, "new"), (popular, "popular")]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, label)| *label)
        .collect::<Vec<_>>()
        .join(" ")
}
