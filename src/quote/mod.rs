//! Quote orchestration
//!
//! A quote runs in a fixed order:
//! 1. Discount rate and commitment years from the assumption set unless overridden
//! 2. Escalator rate from the region tables unless overridden
//! 3. First-year cash flow and protocol deposit (monthly NPV or growing annuity)
//! 4. Carbon credits, debt and the floored net
//! 5. Efficiency score from the fixed-point deposit and impact
//! 6. Result assembly with a typed debug trace
//!
//! No step performs I/O. Values from external services (electricity price,
//! carbon offsets) arrive as inputs.

mod engine;
mod inputs;
mod result;

pub use engine::{EscalatorResolution, QuoteConfig, QuoteEngine};
pub use inputs::{parse_decimal, OffsetSource, Overrides, QuoteInputs, RawQuoteInputs};
pub use result::{
    DebugTrace, QuoteResult, RateSource, TraceCarbon, TraceDeposit, TraceEfficiency, TraceInputs, TraceRates,
};

use crate::assumptions::ProtocolAssumptions;
use crate::error::Result;

/// Compute a quote with the default assumption set and built-in tables
pub fn compute_quote(inputs: &QuoteInputs, config: QuoteConfig) -> Result<QuoteResult> {
    QuoteEngine::new(ProtocolAssumptions::default(), config).compute_quote(inputs)
}
