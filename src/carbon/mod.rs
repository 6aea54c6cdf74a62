//! Carbon accounting: weekly credits from consumption, weekly debt from capacity
//!
//! Credits are driven by consumption (MWh/week) while debt is driven by
//! nameplate capacity (kW). The two bases differ physically; the net is taken
//! as-is and floored at zero.

mod production;

pub use production::{estimate_production_and_debt, ProductionEstimate};

use serde::{Deserialize, Serialize};

use crate::assumptions::{ProtocolAssumptions, WEEKS_PER_YEAR};

/// Step-by-step carbon debt for a system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonDebt {
    /// Metric tons CO2e per kWh (g / 1e6)
    pub tons_per_kwh: f64,
    pub debt_per_kwh_before_uncertainty: f64,
    pub adjusted_debt_per_kwh: f64,
    /// `adjusted_debt_per_kwh * system_size_kw`
    pub total_debt_produced: f64,
    /// Total debt compounded by disaster risk over the commitment period
    pub adjusted_total_debt: f64,
    /// `adjusted_total_debt / (52 * years)`
    pub weekly_debt: f64,
}

impl CarbonDebt {
    /// Carbon debt for `system_size_kw` of capacity committed for `years`
    pub fn for_capacity(system_size_kw: f64, years: u32, assumptions: &ProtocolAssumptions) -> Self {
        let tons_per_kwh = assumptions.tons_co2_per_kwh();
        let debt_per_kwh_before_uncertainty = assumptions.debt_per_kwh_before_uncertainty();
        let adjusted_debt_per_kwh = assumptions.adjusted_debt_per_kwh();
        let total_debt_produced = adjusted_debt_per_kwh * system_size_kw;
        let adjusted_total_debt =
            total_debt_produced * (1.0 + assumptions.disaster_risk_rate).powf(years as f64);
        let weekly_debt = adjusted_total_debt / (WEEKS_PER_YEAR * years as f64);

        Self {
            tons_per_kwh,
            debt_per_kwh_before_uncertainty,
            adjusted_debt_per_kwh,
            total_debt_produced,
            adjusted_total_debt,
            weekly_debt,
        }
    }
}

/// Weekly credits after the uncertainty haircut
pub fn weekly_credits(weekly_consumption_mwh: f64, carbon_offsets_per_mwh: f64, uncertainty: f64) -> f64 {
    weekly_consumption_mwh * carbon_offsets_per_mwh * (1.0 - uncertainty)
}

/// Net weekly carbon position of a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonBalance {
    pub carbon_offsets_per_mwh: f64,
    pub uncertainty_applied: f64,
    pub weekly_credits: f64,
    pub debt: CarbonDebt,
    /// `max(0, weekly_credits - weekly_debt)`
    pub net_weekly_credit: f64,
    pub net_credit_per_mwh: f64,
}

impl CarbonBalance {
    pub fn compute(
        weekly_consumption_mwh: f64,
        system_size_kw: f64,
        carbon_offsets_per_mwh: f64,
        years: u32,
        assumptions: &ProtocolAssumptions,
    ) -> Self {
        let uncertainty_applied = assumptions.uncertainty_multiplier;
        let weekly_credits = weekly_credits(weekly_consumption_mwh, carbon_offsets_per_mwh, uncertainty_applied);
        let debt = CarbonDebt::for_capacity(system_size_kw, years, assumptions);

        let net_weekly_credit = (weekly_credits - debt.weekly_debt).max(0.0);
        let net_credit_per_mwh = net_weekly_credit / weekly_consumption_mwh;

        Self {
            carbon_offsets_per_mwh,
            uncertainty_applied,
            weekly_credits,
            debt,
            net_weekly_credit,
            net_credit_per_mwh,
        }
    }

    pub fn weekly_debt(&self) -> f64 {
        self.debt.weekly_debt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weekly_debt_steps() {
        let a = ProtocolAssumptions::default();
        let debt = CarbonDebt::for_capacity(10.0, 30, &a);

        assert_relative_eq!(debt.tons_per_kwh, 4e-5, max_relative = 1e-12);
        assert_relative_eq!(debt.total_debt_produced, 2.304 * 1.35 * 10.0, max_relative = 1e-12);
        let expected_total = 2.304 * 1.35 * 10.0 * 1.0017f64.powi(30);
        assert_relative_eq!(debt.adjusted_total_debt, expected_total, max_relative = 1e-12);
        assert_relative_eq!(debt.weekly_debt, expected_total / (52.0 * 30.0), max_relative = 1e-12);
    }

    #[test]
    fn test_disaster_compounding_grows_with_years() {
        let a = ProtocolAssumptions::default();
        let short = CarbonDebt::for_capacity(10.0, 10, &a);
        let long = CarbonDebt::for_capacity(10.0, 3_000_000_000, &a);
        assert!(long.adjusted_total_debt > short.adjusted_total_debt);
        assert!(long.adjusted_total_debt.is_infinite());
    }

    #[test]
    fn test_weekly_credits_haircut() {
        assert_relative_eq!(weekly_credits(2.0, 0.5, 0.35), 0.65, max_relative = 1e-12);
    }

    #[test]
    fn test_net_floor_at_zero() {
        let a = ProtocolAssumptions::default();
        let balance = CarbonBalance::compute(0.38, 100_000.0, 0.6, 30, &a);
        assert!(balance.weekly_debt() > balance.weekly_credits * 1000.0);
        assert_eq!(balance.net_weekly_credit, 0.0);
        assert_eq!(balance.net_credit_per_mwh, 0.0);
    }

    #[test]
    fn test_positive_net() {
        let a = ProtocolAssumptions::default();
        let balance = CarbonBalance::compute(0.38, 18.96, 0.6, 30, &a);
        assert!(balance.net_weekly_credit > 0.0);
        assert_relative_eq!(
            balance.net_weekly_credit,
            balance.weekly_credits - balance.weekly_debt(),
            max_relative = 1e-12
        );
        assert_relative_eq!(balance.net_credit_per_mwh, balance.net_weekly_credit / 0.38, max_relative = 1e-12);
    }
}
