//! Command-line browse of the inventory catalog.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use common::browse_query::{FilterSet, PageCursor, PageDirection};
use inventory_browse::{
    BrowseFetcher, BrowseSession, build_browse_request,
    config::ClientConfig,
    http_utils::{okapi_utils::OkapiTransport, request_cache::RequestCache},
    logging::init_logging,
};
use tracing::info;


#[derive(Parser, Debug)]
#[command(name = "inventory-browse", about = "Browse call numbers, contributors and subjects")]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search index, e.g. `contributors`, `browseSubjects`, `lc`
    #[arg(long)]
    index: Option<String>,

    /// Anchor text or a ready-made CQL expression
    #[arg(long)]
    query: Option<String>,

    /// Facet filter as `key=value`; repeat for more values
    #[arg(long = "facet", value_parser = parse_facet)]
    facets: Vec<(String, String)>,

    /// Pages to fetch, the first one included
    #[arg(long, default_value_t = 1)]
    pages: u32,

    #[arg(long, default_value = "next")]
    direction: PageDirection,

    /// Continue from a token printed by an earlier run
    #[arg(long)]
    resume: Option<String>,

    /// Print the request for the first page and exit
    #[arg(long)]
    print_query: bool,
}

fn parse_facet(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn filters_from(cli: &Cli) -> FilterSet {
    let mut filters = FilterSet {
        qindex: cli.index.clone(),
        query: cli.query.clone(),
        ..Default::default()
    };
    for (key, value) in &cli.facets {
        filters.facets.entry(key.clone()).or_default().push(value.clone());
    }
    filters
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref())?;

    if cli.print_query {
        let request = build_browse_request(&filters_from(&cli), &PageCursor::initial(), &config.browse)?;
        match request {
            Some(request) => println!("{}", serde_json::to_string_pretty(&request)?),
            None => println!("no active filter, nothing to request"),
        }
        return Ok(());
    }

    let transport = OkapiTransport::new(&config.okapi)?;
    let cache = Arc::new(RequestCache::new(config.stale_time(), config.cache_max_entries));
    let fetcher = BrowseFetcher::new(Arc::new(transport), config.browse.clone(), cache);
    let mut session = BrowseSession::new(fetcher, config.namespace.clone());

    match &cli.resume {
        Some(token) => session.restore_token(token)?,
        None => session.set_filters(filters_from(&cli)),
    }

    let mut view = session.load().await.context("first browse page")?;
    for page in 1..=cli.pages {
        info!(
            page_number = view.pagination.page_config.page_number,
            total_records = ?view.total_records,
            "browse page"
        );
        for item in view.data.iter().flatten() {
            println!("{item}");
        }
        if page == cli.pages {
            break;
        }
        let has_more = match cli.direction {
            PageDirection::Prev => view.pagination.has_prev_page,
            PageDirection::Next => view.pagination.has_next_page,
        };
        if !has_more {
            break;
        }
        view = session.turn_page(cli.direction).await?;
    }

    eprintln!("resume token: {}", session.resume_token());
    Ok(())
}
