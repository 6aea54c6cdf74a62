//! Protocol assumptions shared by every quote
//!
//! The defaults mirror the "Calculations" tab of the protocol-fee sheet.
//! An assumption set is built once and handed to the engine; nothing in the
//! crate mutates it afterwards.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Default escalator rate for regions missing from the escalator table
pub const DEFAULT_ESCALATOR_RATE: f64 = 0.0331;

/// Weeks per year used to spread lifetime carbon debt
pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Longest accepted commitment period, in years
pub const MAX_COMMITMENT_YEARS: u32 = 100;

/// Container for the constants behind deposit and carbon calculations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolAssumptions {
    /// Embodied carbon of the panels, g CO2e per kWh produced
    pub carbon_footprint_g_per_kwh: f64,

    /// Solar irradiation, hours per year
    pub solar_irradiation_hours: f64,

    pub performance_ratio: f64,

    /// Panel lifetime in years
    pub panel_lifetime_years: f64,

    /// Uncertainty haircut applied to credits and loading applied to debt (0-1)
    pub uncertainty_multiplier: f64,

    /// Annual interest rate used by the spreadsheet protocol-fee estimate
    pub annual_interest_rate: f64,

    /// Commitment period in years
    pub commitment_period_years: u32,

    /// Annual disaster risk compounded over the commitment period
    pub disaster_risk_rate: f64,

    pub days_per_year: f64,

    /// Annual discount rate for the protocol deposit
    pub cashflow_discount_rate: f64,

    /// Escalator rate used when the region has no table entry
    pub default_escalator_rate: f64,
}

impl Default for ProtocolAssumptions {
    fn default() -> Self {
        Self {
            carbon_footprint_g_per_kwh: 40.0,
            solar_irradiation_hours: 2400.0,
            performance_ratio: 0.8,
            panel_lifetime_years: 30.0,
            uncertainty_multiplier: 0.35,
            annual_interest_rate: 0.075,
            commitment_period_years: 30,
            disaster_risk_rate: 0.0017,
            days_per_year: 365.25,
            cashflow_discount_rate: 0.075,
            default_escalator_rate: DEFAULT_ESCALATOR_RATE,
        }
    }
}

impl ProtocolAssumptions {
    /// Load assumptions from a `key,value` CSV, keeping defaults for missing keys
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        loader::load_assumptions(path)
    }

    /// Weeks in a year at `days_per_year` (365.25 / 7)
    pub fn weeks_per_year(&self) -> f64 {
        self.days_per_year / 7.0
    }

    /// Metric tons CO2e per kWh (g -> t)
    pub fn tons_co2_per_kwh(&self) -> f64 {
        self.carbon_footprint_g_per_kwh / 1_000_000.0
    }

    /// Total lifetime carbon debt per kW of capacity, before uncertainty
    pub fn debt_per_kwh_before_uncertainty(&self) -> f64 {
        self.tons_co2_per_kwh()
            * self.solar_irradiation_hours
            * self.performance_ratio
            * self.panel_lifetime_years
    }

    /// Lifetime carbon debt per kW with the uncertainty loading applied
    pub fn adjusted_debt_per_kwh(&self) -> f64 {
        self.debt_per_kwh_before_uncertainty() * (1.0 + self.uncertainty_multiplier)
    }
}
