//! Quote output and its debug trace

use serde::{Deserialize, Serialize};

use super::inputs::OffsetSource;
use crate::carbon::CarbonDebt;
use crate::error::Result;
use crate::valuation::fixed_point::{decode_usd6, decode_wad};
use crate::valuation::PresentValueMethod;

/// Where a rate used by the quote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Supplied in the quote's overrides
    Override,
    /// Taken from the protocol assumption set
    Assumptions,
    /// Region matched an escalator table entry
    RegionTable,
    /// Region had no table entry; the default escalator applied
    DefaultRate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceInputs {
    pub weekly_consumption_mwh: f64,
    pub system_size_kw: f64,
    pub electricity_price_per_kwh: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRates {
    pub discount_rate: f64,
    pub discount_source: RateSource,
    pub escalator_rate: f64,
    pub escalator_source: RateSource,
    pub commitment_years: u32,
    pub commitment_years_overridden: bool,
    /// Region resolved from coordinates; `None` when an escalator override skipped the lookup
    pub region: Option<String>,
    /// True when no bounding box matched and the default region was used
    pub region_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDeposit {
    pub method: PresentValueMethod,
    pub formula: String,
    pub annual_energy_kwh: f64,
    pub first_year_cash_flow: f64,
    pub protocol_deposit_usd: f64,
    pub protocol_deposit_usd6: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceCarbon {
    pub carbon_offsets_per_mwh: f64,
    pub offsets_source: OffsetSource,
    pub uncertainty_applied: f64,
    pub weekly_credits: f64,
    pub debt: CarbonDebt,
    pub net_weekly_credit: f64,
    pub net_credit_per_mwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEfficiency {
    pub weekly_impact_assets_wad: String,
    /// Impact per USD at 18 decimals, before conversion to float
    pub efficiency_wad: String,
    pub efficiency_score: f64,
}

/// Every intermediate quantity of a quote, grouped by pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugTrace {
    pub inputs: TraceInputs,
    pub rates: TraceRates,
    pub protocol_deposit: TraceDeposit,
    pub carbon_metrics: TraceCarbon,
    pub efficiency: TraceEfficiency,
}

/// Result of one quote computation
///
/// Fixed-point amounts are integer strings: USD at 6 decimals, impact assets
/// at 18 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub discount_rate: f64,
    pub escalator_rate: f64,
    pub commitment_years: u32,

    pub protocol_deposit_usd: f64,
    pub protocol_deposit_usd6: String,

    pub weekly_credits: f64,
    pub weekly_debt: f64,
    pub net_weekly_credit: f64,
    pub net_credit_per_mwh: f64,
    pub carbon_offsets_per_mwh: f64,
    pub uncertainty_applied: f64,

    pub weekly_impact_assets_wad: String,
    pub efficiency_score: f64,

    pub debug: DebugTrace,
}

impl QuoteResult {
    /// Deposit decoded back from its 6-decimal encoding
    pub fn decoded_deposit_usd(&self) -> Result<f64> {
        decode_usd6(&self.protocol_deposit_usd6)
    }

    /// Net weekly impact decoded back from its 18-decimal encoding
    pub fn decoded_weekly_impact(&self) -> Result<f64> {
        decode_wad(&self.weekly_impact_assets_wad)
    }

    pub fn method(&self) -> PresentValueMethod {
        self.debug.protocol_deposit.method
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
