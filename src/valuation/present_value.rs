//! Present value of an escalating electricity-savings stream
//!
//! Two methods are supported:
//! - Growing annuity closed form on annual cash flows
//! - Monthly NPV: the first-year cash flow is spread evenly across 12 months,
//!   grown at the monthly escalator and discounted at the monthly discount rate

use serde::{Deserialize, Serialize};

/// Below this gap between discount and escalator the annuity uses `CF1 * N / (1 + r)`
pub const DEGENERATE_RATE_TOLERANCE: f64 = 1e-9;

/// Present-value method used for the protocol deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentValueMethod {
    /// `PV = CF1 * (1 - ((1+g)/(1+r))^N) / (r - g)`
    GrowingAnnuity,
    /// Sum of monthly escalating payments discounted monthly
    MonthlyNpv,
}

impl PresentValueMethod {
    /// Formula identifier recorded in the debug trace
    pub fn formula(&self) -> &'static str {
        match self {
            PresentValueMethod::GrowingAnnuity => "CF1 * (1 - ((1+g)/(1+r))^N) / (r - g)",
            PresentValueMethod::MonthlyNpv => "Monthly NPV with escalating cash flows",
        }
    }

    /// Present value of `first_year_cash_flow` growing at `escalator_rate` for `years`
    pub fn present_value(
        &self,
        first_year_cash_flow: f64,
        discount_rate: f64,
        escalator_rate: f64,
        years: u32,
    ) -> f64 {
        match self {
            PresentValueMethod::GrowingAnnuity => {
                growing_annuity(first_year_cash_flow, discount_rate, escalator_rate, years)
            }
            PresentValueMethod::MonthlyNpv => {
                monthly_npv(first_year_cash_flow, discount_rate, escalator_rate, years)
            }
        }
    }
}

impl std::fmt::Display for PresentValueMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresentValueMethod::GrowingAnnuity => write!(f, "growing-annuity"),
            PresentValueMethod::MonthlyNpv => write!(f, "monthly-npv"),
        }
    }
}

/// Annual kWh from weekly MWh: `weekly * 1000 * weeks_per_year`
pub fn annual_energy_kwh(weekly_consumption_mwh: f64, weeks_per_year: f64) -> f64 {
    weekly_consumption_mwh * 1000.0 * weeks_per_year
}

/// Monthly equivalent of an annual rate, `(1 + rate)^(1/12) - 1`
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Present value of a growing annuity with annual payments in arrears
pub fn growing_annuity(first_year_cash_flow: f64, discount_rate: f64, escalator_rate: f64, years: u32) -> f64 {
    let n = years as f64;
    if (discount_rate - escalator_rate).abs() < DEGENERATE_RATE_TOLERANCE {
        return first_year_cash_flow * n / (1.0 + discount_rate);
    }

    let growth_ratio = (1.0 + escalator_rate) / (1.0 + discount_rate);
    first_year_cash_flow * (1.0 - growth_ratio.powf(n)) / (discount_rate - escalator_rate)
}

/// Net present value of monthly cash flows escalating monthly
pub fn monthly_npv(first_year_cash_flow: f64, discount_rate: f64, escalator_rate: f64, years: u32) -> f64 {
    let monthly_discount = monthly_rate(discount_rate);
    let monthly_escalator = monthly_rate(escalator_rate);
    let monthly_payment = first_year_cash_flow / 12.0;

    (1..=u64::from(years) * 12)
        .map(|month| {
            let month = month as f64;
            let cash_flow = monthly_payment * (1.0 + monthly_escalator).powf(month - 1.0);
            cash_flow / (1.0 + monthly_discount).powf(month)
        })
        .sum()
}

/// Spreadsheet `PV(rate, nper, pmt)` for an ordinary annuity, sign-flipped to a positive value
pub fn spreadsheet_pv(rate: f64, nper: u32, pmt: f64) -> f64 {
    if rate == 0.0 {
        return pmt * nper as f64;
    }
    let pv_factor = (1.0 + rate).powf(-(nper as f64));
    pmt * (1.0 - pv_factor) / rate
}
