//! Batch requoting of stored quotes
//!
//! Holds one engine and recomputes many stored quotes against it, in parallel,
//! reporting old vs new figures for each. Used when assumptions, tables or a
//! regional escalator change and existing quotes must be refreshed.
//!
//! # Example
//! ```ignore
//! let runner = QuoteRunner::new(QuoteEngine::new(ProtocolAssumptions::default(), QuoteConfig::project()));
//! let stored = load_stored_quotes(Path::new("quotes.csv"))?;
//! let outcomes = runner.run_batch(&stored, &Overrides::default());
//! ```

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::quote::{Overrides, QuoteEngine, QuoteResult, RawQuoteInputs};
use crate::valuation::fixed_point::decode_usd6;

/// A previously persisted quote, with numeric fields as stored decimal strings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredQuote {
    pub id: String,
    pub weekly_consumption_mwh: String,
    pub system_size_kw: String,
    pub electricity_price_per_kwh: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub carbon_offsets_per_mwh: Option<String>,
    #[serde(default)]
    pub protocol_deposit_usd6: Option<String>,
    #[serde(default)]
    pub efficiency_score: Option<f64>,
}

impl StoredQuote {
    /// Engine inputs for this quote with batch-wide overrides applied
    pub fn raw_inputs(&self, overrides: &Overrides) -> RawQuoteInputs {
        RawQuoteInputs {
            weekly_consumption_mwh: self.weekly_consumption_mwh.clone(),
            system_size_kw: self.system_size_kw.clone(),
            electricity_price_per_kwh: self.electricity_price_per_kwh.clone(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            carbon_offsets_per_mwh: self.carbon_offsets_per_mwh.clone(),
            discount_rate: overrides.discount_rate.map(|r| r.to_string()),
            escalator_rate: overrides.escalator_rate.map(|r| r.to_string()),
            commitment_years: overrides.commitment_years.map(|y| y.to_string()),
            carbon_offsets_override: overrides.carbon_offsets_per_mwh.map(|r| r.to_string()),
        }
    }

    fn old_deposit_usd(&self) -> Option<f64> {
        self.protocol_deposit_usd6
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| decode_usd6(s).ok())
    }
}

/// Outcome of requoting one stored quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequoteOutcome {
    pub id: String,
    pub success: bool,
    pub old_deposit_usd: Option<f64>,
    pub new_deposit_usd: Option<f64>,
    pub new_deposit_usd6: Option<String>,
    pub old_efficiency: Option<f64>,
    pub new_efficiency: Option<f64>,
    pub escalator_rate: Option<f64>,
    pub net_weekly_credit: Option<f64>,
    pub error: Option<String>,
    pub requoted_at: DateTime<Utc>,
}

impl RequoteOutcome {
    fn from_result(stored: &StoredQuote, result: Result<QuoteResult>, at: DateTime<Utc>) -> Self {
        let mut outcome = Self {
            id: stored.id.clone(),
            success: false,
            old_deposit_usd: stored.old_deposit_usd(),
            new_deposit_usd: None,
            new_deposit_usd6: None,
            old_efficiency: stored.efficiency_score,
            new_efficiency: None,
            escalator_rate: None,
            net_weekly_credit: None,
            error: None,
            requoted_at: at,
        };
        match result {
            Ok(quote) => {
                outcome.success = true;
                outcome.new_deposit_usd = Some(quote.protocol_deposit_usd);
                outcome.new_deposit_usd6 = Some(quote.protocol_deposit_usd6);
                outcome.new_efficiency = Some(quote.efficiency_score);
                outcome.escalator_rate = Some(quote.escalator_rate);
                outcome.net_weekly_credit = Some(quote.net_weekly_credit);
            }
            Err(e) => {
                warn!("requote {} failed: {}", stored.id, e);
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }

    /// New minus old deposit, when both are known
    pub fn deposit_change(&self) -> Option<f64> {
        Some(self.new_deposit_usd? - self.old_deposit_usd?)
    }
}

/// Totals across a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_old_deposit_usd: f64,
    pub total_new_deposit_usd: f64,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[RequoteOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Default::default()
        };
        for o in outcomes {
            if o.success {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            summary.total_old_deposit_usd += o.old_deposit_usd.unwrap_or(0.0);
            summary.total_new_deposit_usd += o.new_deposit_usd.unwrap_or(0.0);
        }
        summary
    }
}

/// Requotes stored quotes against a single engine
#[derive(Debug, Clone)]
pub struct QuoteRunner {
    engine: QuoteEngine,
}

impl QuoteRunner {
    pub fn new(engine: QuoteEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &QuoteEngine {
        &self.engine
    }

    /// Requote one stored quote
    pub fn run(&self, stored: &StoredQuote, overrides: &Overrides) -> RequoteOutcome {
        self.run_at(stored, overrides, Utc::now())
    }

    fn run_at(&self, stored: &StoredQuote, overrides: &Overrides, at: DateTime<Utc>) -> RequoteOutcome {
        let result = stored
            .raw_inputs(overrides)
            .parse()
            .and_then(|inputs| self.engine.compute_quote(&inputs));
        RequoteOutcome::from_result(stored, result, at)
    }

    /// Requote many stored quotes in parallel; output order matches input order
    pub fn run_batch(&self, quotes: &[StoredQuote], overrides: &Overrides) -> Vec<RequoteOutcome> {
        let at = Utc::now();
        info!("requoting {} stored quotes with {}", quotes.len(), self.engine.config().method);

        let outcomes: Vec<RequoteOutcome> = quotes
            .par_iter()
            .map(|stored| self.run_at(stored, overrides, at))
            .collect();

        let summary = BatchSummary::from_outcomes(&outcomes);
        info!(
            "requote finished: {} succeeded, {} failed, deposits {:.2} -> {:.2}",
            summary.succeeded, summary.failed, summary.total_old_deposit_usd, summary.total_new_deposit_usd
        );
        outcomes
    }
}

/// Read stored quotes from a CSV with a header row
pub fn load_stored_quotes(path: &Path) -> Result<Vec<StoredQuote>> {
    let file = File::open(path)?;
    read_stored_quotes(file)
}

pub fn read_stored_quotes<R: std::io::Read>(reader: R) -> Result<Vec<StoredQuote>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut quotes = Vec::new();
    for row in reader.deserialize() {
        quotes.push(row?);
    }
    Ok(quotes)
}

/// Write requote outcomes as CSV
pub fn write_outcomes(path: &Path, outcomes: &[RequoteOutcome]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for outcome in outcomes {
        writer.serialize(outcome)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::ProtocolAssumptions;
    use crate::quote::QuoteConfig;

    const STORED_CSV: &str = "\
id,weekly_consumption_mwh,system_size_kw,electricity_price_per_kwh,latitude,longitude,carbon_offsets_per_mwh,protocol_deposit_usd6,efficiency_score
kc,0.3798269230769231,18.96,0.1126,39.0707091494141,-94.35609788750925,0.6,30000000000,0.000003
co,0.2024615,6.69,0.1075,40.14431191,-105.11670055,0.55,,
bad,abc,6.69,0.1075,40.1,-105.1,0.55,,
";

    fn runner() -> QuoteRunner {
        QuoteRunner::new(QuoteEngine::new(ProtocolAssumptions::default(), QuoteConfig::project()))
    }

    #[test]
    fn test_read_stored_quotes() {
        let quotes = read_stored_quotes(STORED_CSV.as_bytes()).unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].protocol_deposit_usd6.as_deref(), Some("30000000000"));
        assert_eq!(quotes[1].protocol_deposit_usd6, None);
        assert_eq!(quotes[1].efficiency_score, None);
    }

    #[test]
    fn test_batch_keeps_order_and_reports_failures() {
        let quotes = read_stored_quotes(STORED_CSV.as_bytes()).unwrap();
        let outcomes = runner().run_batch(&quotes, &Overrides::default());

        let ids: Vec<_> = outcomes.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["kc", "co", "bad"]);
        assert!(outcomes[0].success);
        assert_eq!(outcomes[0].old_deposit_usd, Some(30_000.0));
        assert!(outcomes[0].deposit_change().is_some());
        assert!(outcomes[1].success);
        assert_eq!(outcomes[1].deposit_change(), None);
        assert!(!outcomes[2].success);
        assert!(outcomes[2].error.as_deref().unwrap().contains("weekly_consumption_mwh"));

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_write_outcomes_round_trip() {
        let quotes = read_stored_quotes(STORED_CSV.as_bytes()).unwrap();
        let outcomes = runner().run_batch(&quotes, &Overrides::default());

        let path = std::env::temp_dir().join(format!("solar_quote_outcomes_{}.csv", std::process::id()));
        write_outcomes(&path, &outcomes).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers[0], "id");
        assert_eq!(headers[1], "success");
        assert!(headers.iter().any(|h| h == "new_deposit_usd6"));
        assert_eq!(headers.last().map(String::as_str), Some("requoted_at"));

        let rows: Vec<RequoteOutcome> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(rows.len(), outcomes.len());
        for (read, written) in rows.iter().zip(&outcomes) {
            assert_eq!(read.id, written.id);
            assert_eq!(read.success, written.success);
            assert_eq!(read.new_deposit_usd6, written.new_deposit_usd6);
            assert_eq!(read.old_deposit_usd, written.old_deposit_usd);
            assert_eq!(read.error, written.error);
            assert_eq!(read.requoted_at, written.requoted_at);
        }
        assert!(rows[2].new_deposit_usd.is_none());
    }

    #[test]
    fn test_batch_override_applies_to_every_quote() {
        let quotes = read_stored_quotes(STORED_CSV.as_bytes()).unwrap();
        let overrides = Overrides {
            escalator_rate: Some(0.05),
            ..Default::default()
        };
        let outcomes = runner().run_batch(&quotes[..2], &overrides);
        assert!(outcomes.iter().all(|o| o.escalator_rate == Some(0.05)));
    }
}
