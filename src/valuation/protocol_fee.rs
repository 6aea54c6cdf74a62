//! Spreadsheet protocol-fee estimate for a plant sized by nameplate and sun hours
//!
//! Used before metered consumption exists: revenue is projected from nameplate
//! output and average daily sunlight rather than from a utility bill.

use serde::{Deserialize, Serialize};

use super::present_value::spreadsheet_pv;
use crate::assumptions::ProtocolAssumptions;
use crate::error::{ensure_finite, QuoteError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolFeeInputs {
    /// Plant nameplate in MW
    pub power_output_mw: f64,
    /// Average sun hours per day at the site
    pub hours_of_sunlight_per_day: f64,
    pub electricity_price_per_kwh: f64,
    /// Annual escalator rate, already resolved for the site
    pub escalator_rate: f64,
    /// Overrides the assumption set's annual interest rate
    pub discount_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolFeeEstimate {
    /// Year-one electricity revenue
    pub first_year_revenue: f64,
    /// PV of the escalating revenue stream
    pub present_value: f64,
    /// PV of the level `present_value / years` stream at the discount rate
    pub protocol_fees: f64,
    pub escalator_rate: f64,
    pub discount_rate: f64,
    pub years: u32,
}

/// Estimate protocol fees the way the sheet's PV block does
///
/// The escalating stream is valued with `PV(-g, N, CF1)`; the sheet keeps
/// this negative-rate sign convention rather than a growing annuity.
pub fn estimate_protocol_fees(
    inputs: &ProtocolFeeInputs,
    assumptions: &ProtocolAssumptions,
) -> Result<ProtocolFeeEstimate> {
    for (field, value) in [
        ("power_output_mw", inputs.power_output_mw),
        ("hours_of_sunlight_per_day", inputs.hours_of_sunlight_per_day),
        ("electricity_price_per_kwh", inputs.electricity_price_per_kwh),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(QuoteError::invalid(field, format!("must be a positive number, got {}", value)));
        }
    }
    if !inputs.escalator_rate.is_finite() {
        return Err(QuoteError::invalid("escalator_rate", "must be finite"));
    }

    let years = assumptions.commitment_period_years;
    let discount_rate = inputs.discount_rate.unwrap_or(assumptions.annual_interest_rate);
    if !discount_rate.is_finite() {
        return Err(QuoteError::invalid("discount_rate", "must be finite"));
    }

    let first_year_revenue = inputs.electricity_price_per_kwh
        * inputs.power_output_mw
        * 1000.0
        * inputs.hours_of_sunlight_per_day
        * assumptions.days_per_year;

    let present_value = spreadsheet_pv(-inputs.escalator_rate, years, first_year_revenue);
    let protocol_fees = spreadsheet_pv(discount_rate, years, present_value / years as f64);

    Ok(ProtocolFeeEstimate {
        first_year_revenue: ensure_finite("first_year_revenue", first_year_revenue)?,
        present_value: ensure_finite("present_value", present_value)?,
        protocol_fees: ensure_finite("protocol_fees", protocol_fees)?,
        escalator_rate: inputs.escalator_rate,
        discount_rate,
        years,
    })
}
