//! Solar Quote CLI
//!
//! Command-line interface for computing quotes, fee estimates and batch requotes

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use solar_quote::carbon::estimate_production_and_debt;
use solar_quote::runner::{load_stored_quotes, write_outcomes, BatchSummary};
use solar_quote::{
    Coordinates, EscalatorTable, Overrides, ProtocolAssumptions, QuoteConfig, QuoteEngine, QuoteInputs,
    QuoteRunner, RegionTable,
};

#[derive(Parser)]
#[command(name = "solar-quote")]
#[command(author, version, long_about = None)]
#[command(about = "Protocol deposit and carbon credit quotes for solar farms")]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Quote flow: project (monthly NPV) or non-account (growing annuity)
    #[arg(long, value_enum, default_value = "project", global = true)]
    flow: Flow,

    /// Protocol assumptions CSV (key,value rows)
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,

    /// Region bounding boxes CSV (region,north,south,east,west)
    #[arg(long, global = true)]
    regions: Option<PathBuf>,

    /// Escalator rates CSV (region,rate)
    #[arg(long, global = true)]
    escalators: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Flow {
    Project,
    NonAccount,
}

#[derive(Args)]
struct OverrideArgs {
    /// Annual discount rate replacing the assumption default
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Annual escalator replacing the regional rate
    #[arg(long)]
    escalator: Option<f64>,

    /// Commitment period in years
    #[arg(long)]
    years: Option<u32>,

    /// Carbon offsets per MWh replacing the geostatistics value
    #[arg(long)]
    offsets_override: Option<f64>,
}

impl OverrideArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            discount_rate: self.discount_rate,
            escalator_rate: self.escalator,
            commitment_years: self.years,
            carbon_offsets_per_mwh: self.offsets_override,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a single quote
    Quote {
        /// Weekly consumption in MWh
        #[arg(long)]
        consumption_mwh: f64,

        /// System size in kW
        #[arg(long)]
        system_kw: f64,

        /// Electricity price in USD per kWh
        #[arg(long)]
        price: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Carbon offsets per MWh from the geostatistics service
        #[arg(long)]
        offsets: Option<f64>,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Print the full result with its debug trace as JSON
        #[arg(long)]
        json: bool,
    },

    /// Requote every stored quote in a CSV and write old vs new figures
    Batch {
        /// Stored quotes CSV
        input: PathBuf,

        /// Output comparison CSV
        #[arg(short, long, default_value = "requote_output.csv")]
        output: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Spreadsheet protocol-fee estimate for a plant
    ProtocolFee {
        #[arg(long)]
        power_mw: f64,

        #[arg(long)]
        sun_hours: f64,

        #[arg(long)]
        price: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long)]
        escalator: Option<f64>,
    },

    /// Weekly production, credits and carbon debt for a plant
    Production {
        #[arg(long)]
        power_mw: f64,

        #[arg(long)]
        sun_hours: f64,

        #[arg(long)]
        offsets: f64,
    },
}

fn build_engine(args: &EngineArgs) -> Result<QuoteEngine> {
    let assumptions = match &args.assumptions {
        Some(path) => ProtocolAssumptions::from_csv_path(path)
            .with_context(|| format!("loading assumptions from {}", path.display()))?,
        None => ProtocolAssumptions::default(),
    };
    let regions = match &args.regions {
        Some(path) => RegionTable::from_csv_path(path)
            .with_context(|| format!("loading regions from {}", path.display()))?,
        None => RegionTable::us_states(),
    };
    let escalators = match &args.escalators {
        Some(path) => EscalatorTable::from_csv_path(path)
            .with_context(|| format!("loading escalators from {}", path.display()))?,
        None => EscalatorTable::us_states(),
    }
    .with_default_rate(assumptions.default_escalator_rate);

    let config = match args.flow {
        Flow::Project => QuoteConfig::project(),
        Flow::NonAccount => QuoteConfig::non_account(),
    };
    Ok(QuoteEngine::with_tables(assumptions, regions, escalators, config))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let engine = build_engine(&cli.engine)?;

    match cli.command {
        Commands::Quote {
            consumption_mwh,
            system_kw,
            price,
            lat,
            lon,
            offsets,
            overrides,
            json,
        } => {
            let mut inputs = QuoteInputs::new(consumption_mwh, system_kw, price, Coordinates::new(lat, lon))
                .with_overrides(overrides.overrides());
            inputs.carbon_offsets_per_mwh = offsets;

            let result = engine.compute_quote(&inputs)?;
            if json {
                println!("{}", result.to_json_pretty()?);
                return Ok(());
            }

            let rates = &result.debug.rates;
            println!("Quote ({})", result.method());
            println!("{}", "-".repeat(40));
            println!("  Region:            {}", rates.region.as_deref().unwrap_or("(override)"));
            println!("  Discount rate:     {:.4}", result.discount_rate);
            println!("  Escalator rate:    {:.4}", result.escalator_rate);
            println!("  Commitment years:  {}", result.commitment_years);
            println!(
                "  Protocol deposit:  ${:.2} ({})",
                result.protocol_deposit_usd, result.protocol_deposit_usd6
            );
            println!("  Weekly credits:    {:.6}", result.weekly_credits);
            println!("  Weekly debt:       {:.6}", result.weekly_debt);
            println!("  Net weekly credit: {:.6}", result.net_weekly_credit);
            println!("  Net per MWh:       {:.6}", result.net_credit_per_mwh);
            println!("  Efficiency score:  {:.12}", result.efficiency_score);
        }

        Commands::Batch {
            input,
            output,
            overrides,
        } => {
            let start = Instant::now();
            let stored = load_stored_quotes(&input)
                .with_context(|| format!("loading stored quotes from {}", input.display()))?;
            println!("Loaded {} stored quotes from {}", stored.len(), input.display());

            let runner = QuoteRunner::new(engine);
            let outcomes = runner.run_batch(&stored, &overrides.overrides());
            write_outcomes(&output, &outcomes)
                .with_context(|| format!("writing outcomes to {}", output.display()))?;

            let summary = BatchSummary::from_outcomes(&outcomes);
            println!("Requoted in {:?}", start.elapsed());
            println!("  Succeeded:     {}", summary.succeeded);
            println!("  Failed:        {}", summary.failed);
            println!("  Old deposits:  ${:.2}", summary.total_old_deposit_usd);
            println!("  New deposits:  ${:.2}", summary.total_new_deposit_usd);
            println!("Results written to: {}", output.display());
        }

        Commands::ProtocolFee {
            power_mw,
            sun_hours,
            price,
            lat,
            lon,
            escalator,
        } => {
            let location = Coordinates::new(lat, lon);
            let est = engine.estimate_protocol_fees(power_mw, sun_hours, price, &location, escalator)?;
            println!("{}", serde_json::to_string_pretty(&est)?);
        }

        Commands::Production {
            power_mw,
            sun_hours,
            offsets,
        } => {
            let est = estimate_production_and_debt(power_mw, sun_hours, offsets, engine.assumptions())?;
            println!("{}", serde_json::to_string_pretty(&est)?);
        }
    }

    Ok(())
}
