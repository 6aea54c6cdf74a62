//! Production-side estimate from nameplate output and sun hours
//!
//! Credits here come from estimated generation (`MW * sun hours * 7`), not from
//! metered consumption, and the net is reported without the zero floor.

use serde::{Deserialize, Serialize};

use super::{weekly_credits, CarbonDebt};
use crate::assumptions::{ProtocolAssumptions, WEEKS_PER_YEAR};
use crate::error::{ensure_finite, QuoteError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEstimate {
    /// Estimated weekly generation in MWh
    pub weekly_production_mwh: f64,
    pub adjusted_weekly_credits: f64,
    pub weekly_carbon_debt: f64,
    /// Weekly debt scaled back up over the commitment period
    pub adjusted_carbon_debt: f64,
    /// Credits minus debt; may be negative
    pub net_weekly_credits: f64,
}

/// Estimate weekly credits and debt for a plant of `power_output_mw` nameplate
pub fn estimate_production_and_debt(
    power_output_mw: f64,
    hours_of_sunlight_per_day: f64,
    carbon_offsets_per_mwh: f64,
    assumptions: &ProtocolAssumptions,
) -> Result<ProductionEstimate> {
    for (field, value) in [
        ("power_output_mw", power_output_mw),
        ("hours_of_sunlight_per_day", hours_of_sunlight_per_day),
        ("carbon_offsets_per_mwh", carbon_offsets_per_mwh),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(QuoteError::invalid(field, format!("must be a non-negative number, got {}", value)));
        }
    }

    let years = assumptions.commitment_period_years;
    let weekly_production_mwh = power_output_mw * hours_of_sunlight_per_day * 7.0;
    let adjusted_weekly_credits = weekly_credits(
        weekly_production_mwh,
        carbon_offsets_per_mwh,
        assumptions.uncertainty_multiplier,
    );

    let debt = CarbonDebt::for_capacity(power_output_mw * 1000.0, years, assumptions);
    let weekly_carbon_debt = debt.weekly_debt;
    let adjusted_carbon_debt = weekly_carbon_debt * WEEKS_PER_YEAR * years as f64;

    Ok(ProductionEstimate {
        weekly_production_mwh,
        adjusted_weekly_credits: ensure_finite("adjusted_weekly_credits", adjusted_weekly_credits)?,
        weekly_carbon_debt: ensure_finite("weekly_carbon_debt", weekly_carbon_debt)?,
        adjusted_carbon_debt: ensure_finite("adjusted_carbon_debt", adjusted_carbon_debt)?,
        net_weekly_credits: adjusted_weekly_credits - weekly_carbon_debt,
    })
}
