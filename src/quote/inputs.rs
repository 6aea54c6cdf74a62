//! Quote inputs and the decimal-string ingestion step
//!
//! Callers at the HTTP/database boundary hold numbers as decimal strings.
//! [`RawQuoteInputs::parse`] is the single place those strings become floats;
//! everything past it works on validated `f64` values.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::MAX_COMMITMENT_YEARS;
use crate::error::{QuoteError, Result};
use crate::geography::Coordinates;

/// Per-quote replacements for looked-up or default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    pub discount_rate: Option<f64>,
    /// Skips region resolution entirely when present
    pub escalator_rate: Option<f64>,
    pub commitment_years: Option<u32>,
    /// Used instead of the geostatistics value
    pub carbon_offsets_per_mwh: Option<f64>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self == &Overrides::default()
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("discount_rate", self.discount_rate),
            ("escalator_rate", self.escalator_rate),
        ] {
            if let Some(rate) = value {
                if !rate.is_finite() || rate <= -1.0 {
                    return Err(QuoteError::invalid(
                        field,
                        format!("override {} is not a usable annual rate", rate),
                    ));
                }
            }
        }
        if let Some(years) = self.commitment_years {
            if !(1..=MAX_COMMITMENT_YEARS).contains(&years) {
                return Err(QuoteError::invalid(
                    "commitment_years",
                    format!("override {} outside 1..={} years", years, MAX_COMMITMENT_YEARS),
                ));
            }
        }
        if let Some(offsets) = self.carbon_offsets_per_mwh {
            if !offsets.is_finite() || offsets < 0.0 {
                return Err(QuoteError::invalid(
                    "carbon_offsets_per_mwh",
                    format!("override {} must be a non-negative number", offsets),
                ));
            }
        }
        Ok(())
    }
}

/// Where the carbon-offset rate used by a quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetSource {
    Override,
    Geostatistics,
}

/// Validated numeric inputs for one quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteInputs {
    /// Weekly consumption in MWh
    pub weekly_consumption_mwh: f64,
    /// System nameplate in kW
    pub system_size_kw: f64,
    /// Electricity price from the utility bill, USD per kWh
    pub electricity_price_per_kwh: f64,
    pub location: Coordinates,
    /// Carbon offsets per MWh already fetched from the geostatistics service
    #[serde(default)]
    pub carbon_offsets_per_mwh: Option<f64>,
    #[serde(default)]
    pub overrides: Overrides,
}

impl QuoteInputs {
    pub fn new(
        weekly_consumption_mwh: f64,
        system_size_kw: f64,
        electricity_price_per_kwh: f64,
        location: Coordinates,
    ) -> Self {
        Self {
            weekly_consumption_mwh,
            system_size_kw,
            electricity_price_per_kwh,
            location,
            carbon_offsets_per_mwh: None,
            overrides: Overrides::default(),
        }
    }

    /// Attach the geostatistics carbon-offset rate
    pub fn with_carbon_offsets(mut self, carbon_offsets_per_mwh: f64) -> Self {
        self.carbon_offsets_per_mwh = Some(carbon_offsets_per_mwh);
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Reject non-finite or non-positive required fields and bad overrides
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("weekly_consumption_mwh", self.weekly_consumption_mwh),
            ("system_size_kw", self.system_size_kw),
            ("electricity_price_per_kwh", self.electricity_price_per_kwh),
        ] {
            if !value.is_finite() {
                return Err(QuoteError::invalid(field, format!("{} is not a finite number", value)));
            }
            if value <= 0.0 {
                return Err(QuoteError::invalid(field, format!("must be positive, got {}", value)));
            }
        }

        if !self.location.is_valid() {
            return Err(QuoteError::invalid(
                "location",
                format!(
                    "({}, {}) is outside [-90, 90] x [-180, 180]",
                    self.location.latitude, self.location.longitude
                ),
            ));
        }

        if let Some(offsets) = self.carbon_offsets_per_mwh {
            if !offsets.is_finite() || offsets < 0.0 {
                return Err(QuoteError::invalid(
                    "carbon_offsets_per_mwh",
                    format!("{} must be a non-negative number", offsets),
                ));
            }
        }

        self.overrides.validate()
    }

    /// Carbon-offset rate to use: the override if present, else the geostatistics value
    pub fn resolved_carbon_offsets(&self) -> Result<(f64, OffsetSource)> {
        match (self.overrides.carbon_offsets_per_mwh, self.carbon_offsets_per_mwh) {
            (Some(rate), _) => Ok((rate, OffsetSource::Override)),
            (None, Some(rate)) => Ok((rate, OffsetSource::Geostatistics)),
            (None, None) => Err(QuoteError::invalid(
                "carbon_offsets_per_mwh",
                "no geostatistics value or override supplied",
            )),
        }
    }
}

/// Quote inputs as decimal strings, the way they arrive from the API and database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuoteInputs {
    pub weekly_consumption_mwh: String,
    pub system_size_kw: String,
    pub electricity_price_per_kwh: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub carbon_offsets_per_mwh: Option<String>,
    #[serde(default)]
    pub discount_rate: Option<String>,
    #[serde(default)]
    pub escalator_rate: Option<String>,
    #[serde(default)]
    pub commitment_years: Option<String>,
    #[serde(default)]
    pub carbon_offsets_override: Option<String>,
}

impl RawQuoteInputs {
    /// Parse every field exactly, then validate the result
    pub fn parse(&self) -> Result<QuoteInputs> {
        let inputs = QuoteInputs {
            weekly_consumption_mwh: parse_decimal("weekly_consumption_mwh", &self.weekly_consumption_mwh)?,
            system_size_kw: parse_decimal("system_size_kw", &self.system_size_kw)?,
            electricity_price_per_kwh: parse_decimal("electricity_price_per_kwh", &self.electricity_price_per_kwh)?,
            location: Coordinates::new(
                parse_decimal("latitude", &self.latitude)?,
                parse_decimal("longitude", &self.longitude)?,
            ),
            carbon_offsets_per_mwh: parse_optional("carbon_offsets_per_mwh", &self.carbon_offsets_per_mwh)?,
            overrides: Overrides {
                discount_rate: parse_optional("discount_rate", &self.discount_rate)?,
                escalator_rate: parse_optional("escalator_rate", &self.escalator_rate)?,
                commitment_years: match non_blank(&self.commitment_years) {
                    Some(raw) => Some(parse_years("commitment_years", raw)?),
                    None => None,
                },
                carbon_offsets_per_mwh: parse_optional("carbon_offsets_override", &self.carbon_offsets_override)?,
            },
        };
        inputs.validate()?;
        Ok(inputs)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn to_decimal(field: &'static str, raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    let parse_err = || QuoteError::Parse {
        field,
        value: raw.to_string(),
    };
    if trimmed.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(trimmed).map_err(|_| parse_err())
    } else {
        Decimal::from_str(trimmed).map_err(|_| parse_err())
    }
}

/// Parse a decimal string to the nearest `f64`
///
/// `Decimal` validates the syntax exactly; the normalized digits are then
/// converted with the correctly rounded `f64` parser.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<f64> {
    let decimal = to_decimal(field, raw)?;
    decimal
        .normalize()
        .to_string()
        .parse::<f64>()
        .map_err(|_| QuoteError::Parse {
            field,
            value: raw.to_string(),
        })
}

fn parse_optional(field: &'static str, raw: &Option<String>) -> Result<Option<f64>> {
    non_blank(raw).map(|s| parse_decimal(field, s)).transpose()
}

fn parse_years(field: &'static str, raw: &str) -> Result<u32> {
    let decimal = to_decimal(field, raw)?;
    if !decimal.fract().is_zero() {
        return Err(QuoteError::invalid(field, format!("{} is not a whole number of years", raw)));
    }
    decimal.to_u32().ok_or_else(|| QuoteError::Parse {
        field,
        value: raw.to_string(),
    })
}
