//! Annual electricity-price escalator rates by region

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::assumptions::DEFAULT_ESCALATOR_RATE;
use crate::error::{QuoteError, Result};

const STATE_ESCALATOR_RATES: &[(&str, f64)] = &[
    ("Hawaii", 0.0436),
    ("Kentucky", 0.0339),
    ("California", 0.0334),
    ("Wisconsin", 0.033),
    ("Massachusetts", 0.033),
    ("Indiana", 0.0312),
    ("Alabama", 0.0308),
    ("West Virginia", 0.0304),
    ("Michigan", 0.0296),
    ("Washington", 0.0295),
    ("Tennessee", 0.0292),
    ("Oregon", 0.029),
    ("Nevada", 0.0289),
    ("Connecticut", 0.0288),
    ("Idaho", 0.0286),
    ("Alaska", 0.0284),
    ("Minnesota", 0.0273),
    ("Colorado", 0.0266),
    ("Rhode Island", 0.0263),
    ("Oklahoma", 0.0259),
    ("South Carolina", 0.0255),
    ("New Hampshire", 0.0253),
    ("Kansas", 0.0245),
    ("Georgia", 0.024),
    ("District of Columbia", 0.0239),
    ("Mississippi", 0.0238),
    ("Wyoming", 0.0234),
    ("Montana", 0.0233),
    ("Maine", 0.023),
    ("Vermont", 0.0229),
    ("Virginia", 0.0225),
    ("Maryland", 0.0224),
    ("North Dakota", 0.0224),
    ("Louisiana", 0.0223),
    ("Missouri", 0.0222),
    ("Texas", 0.0221),
    ("Florida", 0.022),
    ("South Dakota", 0.0219),
    ("Nebraska", 0.0218),
    ("Ohio", 0.0196),
    ("Pennsylvania", 0.0195),
    ("Iowa", 0.0188),
    ("Utah", 0.0187),
    ("New Mexico", 0.0185),
    ("New York", 0.018),
    ("Illinois", 0.0169),
    ("Arkansas", 0.0169),
    ("North Carolina", 0.0165),
    ("Delaware", 0.0161),
    ("Arizona", 0.0157),
    ("New Jersey", 0.0133),
];

/// Lowercase and drop whitespace so "New York", "newyork" and "NEW YORK" match
pub fn normalize_region(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Deserialize)]
struct EscalatorRow {
    region: String,
    rate: f64,
}

/// Immutable region -> annual escalator rate table
#[derive(Debug, Clone)]
pub struct EscalatorTable {
    /// (normalized name, rate)
    rates: Vec<(String, f64)>,
    default_rate: f64,
}

impl Default for EscalatorTable {
    fn default() -> Self {
        Self::us_states()
    }
}

impl EscalatorTable {
    /// Built-in US state table with the 0.0331 global default
    pub fn us_states() -> Self {
        Self {
            rates: STATE_ESCALATOR_RATES
                .iter()
                .map(|&(state, rate)| (normalize_region(state), rate))
                .collect(),
            default_rate: DEFAULT_ESCALATOR_RATE,
        }
    }

    /// Build from (region, rate) pairs
    pub fn from_rates<I, S>(rates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut table = Vec::new();
        for (region, rate) in rates {
            if !rate.is_finite() {
                return Err(QuoteError::Table {
                    table: "escalator_rates".to_string(),
                    reason: format!("rate for {} is not finite", region.as_ref()),
                });
            }
            table.push((normalize_region(region.as_ref()), rate));
        }
        Ok(Self {
            rates: table,
            default_rate: DEFAULT_ESCALATOR_RATE,
        })
    }

    /// Load `region,rate` rows
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            let row: EscalatorRow = row?;
            rows.push((row.region, row.rate));
        }
        Self::from_rates(rows)
    }

    /// Replace the rate returned for absent or unknown regions
    pub fn with_default_rate(mut self, default_rate: f64) -> Self {
        self.default_rate = default_rate;
        self
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    /// Table entry for a region, if any
    pub fn lookup(&self, region: &str) -> Option<f64> {
        let key = normalize_region(region);
        self.rates
            .iter()
            .find(|(name, _)| *name == key)
            .map(|&(_, rate)| rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_and_space_insensitive() {
        let table = EscalatorTable::us_states();
        assert_eq!(table.lookup("New York"), Some(0.018));
        assert_eq!(table.lookup("newyork"), Some(0.018));
        assert_eq!(table.lookup("  NEW  YORK "), Some(0.018));
        assert_eq!(table.lookup("District of Columbia"), Some(0.0239));
    }

    #[test]
    fn test_unmatched_regions_have_no_entry() {
        let table = EscalatorTable::us_states();
        assert_eq!(table.lookup("Atlantis"), None);
        assert_eq!(table.lookup(crate::geography::DEFAULT_REGION), None);
        assert_eq!(table.default_rate(), 0.0331);
    }

    #[test]
    fn test_every_builtin_region_has_a_rate() {
        let regions = crate::geography::RegionTable::us_states();
        let rates = EscalatorTable::us_states();
        for bounds in regions.iter() {
            assert!(rates.lookup(&bounds.region).is_some(), "missing rate for {}", bounds.region);
        }
    }

    #[test]
    fn test_rates_in_expected_band() {
        for &(state, rate) in STATE_ESCALATOR_RATES {
            assert!((0.013..=0.044).contains(&rate), "{} has rate {}", state, rate);
        }
    }

    #[test]
    fn test_custom_default() {
        let table = EscalatorTable::from_rates(vec![("Lebanon", 0.05)])
            .unwrap()
            .with_default_rate(0.04);
        assert_eq!(table.lookup("lebanon"), Some(0.05));
        assert_eq!(table.lookup("Ohio"), None);
        assert_eq!(table.default_rate(), 0.04);
        assert!(EscalatorTable::from_rates(vec![("Bad", f64::NAN)]).is_err());
    }
}
