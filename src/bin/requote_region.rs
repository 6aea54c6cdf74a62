//! Requote stored quotes in one region with a forced escalator rate
//!
//! Used when a region's escalator was wrong at quote time. Quotes whose
//! coordinates resolve to `--region` (or to the unresolved fallback with
//! `--include-unresolved`) are recomputed with `--escalator` as an override.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use solar_quote::geography::{normalize_region, DEFAULT_REGION};
use solar_quote::quote::parse_decimal;
use solar_quote::runner::{load_stored_quotes, write_outcomes, BatchSummary};
use solar_quote::{
    Coordinates, Overrides, ProtocolAssumptions, QuoteConfig, QuoteEngine, QuoteRunner, RegionTable,
    StoredQuote,
};

#[derive(Parser)]
#[command(name = "requote_region")]
#[command(about = "Requote stored quotes in one region with a forced escalator rate")]
struct Cli {
    /// Stored quotes CSV
    input: PathBuf,

    /// Region whose quotes are rerun
    #[arg(long)]
    region: String,

    /// Escalator rate to force on every rerun quote
    #[arg(long)]
    escalator: f64,

    /// Also rerun quotes that resolved to no region
    #[arg(long)]
    include_unresolved: bool,

    /// Use the growing-annuity flow instead of monthly NPV
    #[arg(long)]
    non_account: bool,

    #[arg(short, long, default_value = "requote_region_output.csv")]
    output: PathBuf,
}

fn resolved_region(regions: &RegionTable, quote: &StoredQuote) -> Option<String> {
    let lat = parse_decimal("latitude", &quote.latitude).ok()?;
    let lon = parse_decimal("longitude", &quote.longitude).ok()?;
    Some(regions.resolve(&Coordinates::new(lat, lon)).name.to_string())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let stored = load_stored_quotes(&cli.input)
        .with_context(|| format!("loading stored quotes from {}", cli.input.display()))?;

    let regions = RegionTable::us_states();
    let target = normalize_region(&cli.region);
    let unresolved = normalize_region(DEFAULT_REGION);
    let selected: Vec<StoredQuote> = stored
        .into_iter()
        .filter(|q| match resolved_region(&regions, q) {
            Some(name) => {
                let name = normalize_region(&name);
                name == target || (cli.include_unresolved && name == unresolved)
            }
            None => false,
        })
        .collect();
    info!("{} stored quotes selected for region {}", selected.len(), cli.region);

    let config = if cli.non_account {
        QuoteConfig::non_account()
    } else {
        QuoteConfig::project()
    };
    let runner = QuoteRunner::new(QuoteEngine::new(ProtocolAssumptions::default(), config));
    let overrides = Overrides {
        escalator_rate: Some(cli.escalator),
        ..Default::default()
    };
    let outcomes = runner.run_batch(&selected, &overrides);
    write_outcomes(&cli.output, &outcomes)
        .with_context(|| format!("writing outcomes to {}", cli.output.display()))?;

    let summary = BatchSummary::from_outcomes(&outcomes);
    println!(
        "Requoted {} quotes in {} at escalator {} in {:?}",
        summary.total,
        cli.region,
        cli.escalator,
        start.elapsed()
    );
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed:    {}", summary.failed);
    for o in outcomes.iter().filter(|o| o.success) {
        if let Some(change) = o.deposit_change() {
            println!(
                "  {:<20} {:>14.2} -> {:>14.2} ({:+.2})",
                o.id,
                o.old_deposit_usd.unwrap_or(0.0),
                o.new_deposit_usd.unwrap_or(0.0),
                change
            );
        }
    }
    println!("Results written to: {}", cli.output.display());

    Ok(())
}
