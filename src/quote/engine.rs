//! Quote engine: rates, deposit, carbon balance and efficiency in one pass

use log::{debug, warn};

use super::inputs::QuoteInputs;
use super::result::{
    DebugTrace, QuoteResult, RateSource, TraceCarbon, TraceDeposit, TraceEfficiency, TraceInputs, TraceRates,
};
use crate::assumptions::{ProtocolAssumptions, MAX_COMMITMENT_YEARS};
use crate::carbon::CarbonBalance;
use crate::efficiency::{efficiency_score, efficiency_wad};
use crate::error::{ensure_finite, QuoteError, Result};
use crate::geography::{Coordinates, EscalatorTable, RegionTable};
use crate::valuation::fixed_point::{encode_usd6, encode_wad};
use crate::valuation::{
    annual_energy_kwh, estimate_protocol_fees, PresentValueMethod, ProtocolFeeEstimate, ProtocolFeeInputs,
};

/// Configuration for a quote flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteConfig {
    /// Present-value method used for the protocol deposit
    pub method: PresentValueMethod,
}

impl QuoteConfig {
    /// Account-holder project quotes: monthly NPV
    pub fn project() -> Self {
        Self {
            method: PresentValueMethod::MonthlyNpv,
        }
    }

    /// Quotes requested without an account: growing annuity
    pub fn non_account() -> Self {
        Self {
            method: PresentValueMethod::GrowingAnnuity,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self::project()
    }
}

/// Escalator rate and how it was found
#[derive(Debug, Clone, PartialEq)]
pub struct EscalatorResolution {
    pub rate: f64,
    pub source: RateSource,
    pub region: Option<String>,
    pub region_fallback: bool,
}

/// Quote engine holding the assumption set and rate tables
///
/// Holds no per-quote state; one engine can serve any number of threads.
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    assumptions: ProtocolAssumptions,
    regions: RegionTable,
    escalators: EscalatorTable,
    config: QuoteConfig,
}

impl QuoteEngine {
    /// Create an engine with the built-in region and escalator tables
    pub fn new(assumptions: ProtocolAssumptions, config: QuoteConfig) -> Self {
        let escalators = EscalatorTable::us_states().with_default_rate(assumptions.default_escalator_rate);
        Self {
            assumptions,
            regions: RegionTable::us_states(),
            escalators,
            config,
        }
    }

    /// Create an engine with caller-supplied tables
    pub fn with_tables(
        assumptions: ProtocolAssumptions,
        regions: RegionTable,
        escalators: EscalatorTable,
        config: QuoteConfig,
    ) -> Self {
        Self {
            assumptions,
            regions,
            escalators,
            config,
        }
    }

    pub fn assumptions(&self) -> &ProtocolAssumptions {
        &self.assumptions
    }

    pub fn config(&self) -> QuoteConfig {
        self.config
    }

    /// Escalator for a location; an override short-circuits the region lookup
    pub fn resolve_escalator(&self, location: &Coordinates, override_rate: Option<f64>) -> EscalatorResolution {
        if let Some(rate) = override_rate {
            return EscalatorResolution {
                rate,
                source: RateSource::Override,
                region: None,
                region_fallback: false,
            };
        }

        let region = self.regions.resolve(location);
        if region.is_fallback {
            warn!(
                "no region contains ({}, {}); using default region {}",
                location.latitude, location.longitude, region.name
            );
        }

        let (rate, source) = match self.escalators.lookup(region.name) {
            Some(rate) => (rate, RateSource::RegionTable),
            None => {
                warn!(
                    "no escalator rate for region {}; using default {}",
                    region.name,
                    self.escalators.default_rate()
                );
                (self.escalators.default_rate(), RateSource::DefaultRate)
            }
        };

        EscalatorResolution {
            rate,
            source,
            region: Some(region.name.to_string()),
            region_fallback: region.is_fallback,
        }
    }

    /// Compute a full quote
    pub fn compute_quote(&self, inputs: &QuoteInputs) -> Result<QuoteResult> {
        inputs.validate()?;
        let a = &self.assumptions;
        let overrides = &inputs.overrides;

        // Rates
        let (discount_rate, discount_source) = match overrides.discount_rate {
            Some(rate) => (rate, RateSource::Override),
            None => (a.cashflow_discount_rate, RateSource::Assumptions),
        };
        if !overrides.is_empty() {
            debug!("applying overrides {:?}", overrides);
        }
        let years = overrides.commitment_years.unwrap_or(a.commitment_period_years);
        if !(1..=MAX_COMMITMENT_YEARS).contains(&years) {
            return Err(QuoteError::invalid(
                "commitment_years",
                format!("{} outside 1..={} years", years, MAX_COMMITMENT_YEARS),
            ));
        }
        let escalator = self.resolve_escalator(&inputs.location, overrides.escalator_rate);
        debug!(
            "rates: discount {} ({:?}), escalator {} ({:?}, region {:?}), years {}",
            discount_rate, discount_source, escalator.rate, escalator.source, escalator.region, years
        );

        // Protocol deposit
        let annual_kwh = annual_energy_kwh(inputs.weekly_consumption_mwh, a.weeks_per_year());
        let first_year_cash_flow = annual_kwh * inputs.electricity_price_per_kwh;
        let deposit = self
            .config
            .method
            .present_value(first_year_cash_flow, discount_rate, escalator.rate, years);
        let deposit = ensure_finite("protocol_deposit_usd", deposit)?;
        let deposit_usd6 = encode_usd6("protocol_deposit_usd", deposit)?;
        debug!(
            "deposit: {} kWh/yr, first-year cash flow {:.2}, {} -> {:.2}",
            annual_kwh, first_year_cash_flow, self.config.method, deposit
        );

        // Carbon balance
        let (carbon_offsets_per_mwh, offsets_source) = inputs.resolved_carbon_offsets()?;
        let carbon = CarbonBalance::compute(
            inputs.weekly_consumption_mwh,
            inputs.system_size_kw,
            carbon_offsets_per_mwh,
            years,
            a,
        );
        ensure_finite("weekly_credits", carbon.weekly_credits)?;
        ensure_finite("weekly_debt", carbon.weekly_debt())?;
        ensure_finite("net_weekly_credit", carbon.net_weekly_credit)?;
        ensure_finite("net_credit_per_mwh", carbon.net_credit_per_mwh)?;
        debug!(
            "carbon: credits {:.6}, debt {:.6}, net {:.6}",
            carbon.weekly_credits,
            carbon.weekly_debt(),
            carbon.net_weekly_credit
        );

        // Efficiency
        let impact_wad = encode_wad("net_weekly_credit", carbon.net_weekly_credit)?;
        let score_wad = efficiency_wad(deposit_usd6, impact_wad)?;
        let score = ensure_finite("efficiency_score", efficiency_score(deposit_usd6, impact_wad)?)?;

        let protocol_deposit_usd6 = deposit_usd6.to_string();
        let weekly_impact_assets_wad = impact_wad.to_string();

        let debug = DebugTrace {
            inputs: TraceInputs {
                weekly_consumption_mwh: inputs.weekly_consumption_mwh,
                system_size_kw: inputs.system_size_kw,
                electricity_price_per_kwh: inputs.electricity_price_per_kwh,
                latitude: inputs.location.latitude,
                longitude: inputs.location.longitude,
            },
            rates: TraceRates {
                discount_rate,
                discount_source,
                escalator_rate: escalator.rate,
                escalator_source: escalator.source,
                commitment_years: years,
                commitment_years_overridden: overrides.commitment_years.is_some(),
                region: escalator.region,
                region_fallback: escalator.region_fallback,
            },
            protocol_deposit: TraceDeposit {
                method: self.config.method,
                formula: self.config.method.formula().to_string(),
                annual_energy_kwh: annual_kwh,
                first_year_cash_flow,
                protocol_deposit_usd: deposit,
                protocol_deposit_usd6: protocol_deposit_usd6.clone(),
            },
            carbon_metrics: TraceCarbon {
                carbon_offsets_per_mwh,
                offsets_source,
                uncertainty_applied: carbon.uncertainty_applied,
                weekly_credits: carbon.weekly_credits,
                debt: carbon.debt.clone(),
                net_weekly_credit: carbon.net_weekly_credit,
                net_credit_per_mwh: carbon.net_credit_per_mwh,
            },
            efficiency: TraceEfficiency {
                weekly_impact_assets_wad: weekly_impact_assets_wad.clone(),
                efficiency_wad: score_wad.to_string(),
                efficiency_score: score,
            },
        };

        Ok(QuoteResult {
            discount_rate,
            escalator_rate: escalator.rate,
            commitment_years: years,
            protocol_deposit_usd: deposit,
            protocol_deposit_usd6,
            weekly_credits: carbon.weekly_credits,
            weekly_debt: carbon.weekly_debt(),
            net_weekly_credit: carbon.net_weekly_credit,
            net_credit_per_mwh: carbon.net_credit_per_mwh,
            carbon_offsets_per_mwh,
            uncertainty_applied: carbon.uncertainty_applied,
            weekly_impact_assets_wad,
            efficiency_score: score,
            debug,
        })
    }

    /// Spreadsheet protocol-fee estimate for a plant at `location`
    pub fn estimate_protocol_fees(
        &self,
        power_output_mw: f64,
        hours_of_sunlight_per_day: f64,
        electricity_price_per_kwh: f64,
        location: &Coordinates,
        escalator_override: Option<f64>,
    ) -> Result<ProtocolFeeEstimate> {
        let escalator = self.resolve_escalator(location, escalator_override);
        let inputs = ProtocolFeeInputs {
            power_output_mw,
            hours_of_sunlight_per_day,
            electricity_price_per_kwh,
            escalator_rate: escalator.rate,
            discount_rate: None,
        };
        estimate_protocol_fees(&inputs, &self.assumptions)
    }
}
