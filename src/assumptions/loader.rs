//! CSV-based assumption loader
//!
//! Reads an assumption override file with a `key,value` header:
//!
//! ```text
//! key,value
//! commitment_period_years,10
//! cashflow_discount_rate,0.08
//! ```

use std::fs::File;
use std::path::Path;

use log::debug;

use super::{ProtocolAssumptions, MAX_COMMITMENT_YEARS};
use crate::error::{QuoteError, Result};

/// Load assumptions from a CSV file, starting from the defaults
pub fn load_assumptions(path: &Path) -> Result<ProtocolAssumptions> {
    let file = File::open(path)?;
    read_assumptions(file, &path.display().to_string())
}

/// Parse assumption rows from any reader
pub fn read_assumptions<R: std::io::Read>(reader: R, source: &str) -> Result<ProtocolAssumptions> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut assumptions = ProtocolAssumptions::default();

    for result in reader.records() {
        let record = result?;
        let key = record.get(0).unwrap_or("").trim();
        let raw = record.get(1).unwrap_or("").trim();
        let value: f64 = raw.parse().map_err(|_| QuoteError::Table {
            table: source.to_string(),
            reason: format!("value {:?} for `{}` is not a number", raw, key),
        })?;
        if !value.is_finite() {
            return Err(QuoteError::Table {
                table: source.to_string(),
                reason: format!("value for `{}` is not finite", key),
            });
        }

        apply(&mut assumptions, key, value).map_err(|reason| QuoteError::Table {
            table: source.to_string(),
            reason,
        })?;
        debug!("assumption override {} = {}", key, value);
    }

    Ok(assumptions)
}

fn apply(a: &mut ProtocolAssumptions, key: &str, value: f64) -> std::result::Result<(), String> {
    match key {
        "carbon_footprint_g_per_kwh" => a.carbon_footprint_g_per_kwh = value,
        "solar_irradiation_hours" => a.solar_irradiation_hours = value,
        "performance_ratio" => a.performance_ratio = value,
        "panel_lifetime_years" => a.panel_lifetime_years = value,
        "uncertainty_multiplier" => {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("uncertainty_multiplier {} outside [0, 1]", value));
            }
            a.uncertainty_multiplier = value;
        }
        "annual_interest_rate" => a.annual_interest_rate = value,
        "commitment_period_years" => {
            if value < 1.0 || value.fract() != 0.0 {
                return Err(format!("commitment_period_years {} is not a positive whole number", value));
            }
            if value > MAX_COMMITMENT_YEARS as f64 {
                return Err(format!(
                    "commitment_period_years {} exceeds {} years",
                    value, MAX_COMMITMENT_YEARS
                ));
            }
            a.commitment_period_years = value as u32;
        }
        "disaster_risk_rate" => a.disaster_risk_rate = value,
        "days_per_year" => a.days_per_year = value,
        "cashflow_discount_rate" => a.cashflow_discount_rate = value,
        "default_escalator_rate" => a.default_escalator_rate = value,
        other => return Err(format!("unknown assumption `{}`", other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let csv = "key,value\ncommitment_period_years,10\ncashflow_discount_rate,0.08\n";
        let a = read_assumptions(csv.as_bytes(), "inline").unwrap();

        assert_eq!(a.commitment_period_years, 10);
        assert_eq!(a.cashflow_discount_rate, 0.08);
        assert_eq!(a.performance_ratio, ProtocolAssumptions::default().performance_ratio);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let csv = "key,value\nmystery_rate,0.1\n";
        let err = read_assumptions(csv.as_bytes(), "inline").unwrap_err();
        assert!(err.to_string().contains("mystery_rate"));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(read_assumptions("key,value\nperformance_ratio,abc\n".as_bytes(), "inline").is_err());
        assert!(read_assumptions("key,value\nuncertainty_multiplier,1.5\n".as_bytes(), "inline").is_err());
        assert!(read_assumptions("key,value\ncommitment_period_years,2.5\n".as_bytes(), "inline").is_err());
        assert!(read_assumptions("key,value\ncommitment_period_years,101\n".as_bytes(), "inline").is_err());
        assert!(read_assumptions("key,value\ncommitment_period_years,3000000000\n".as_bytes(), "inline").is_err());
    }
}
