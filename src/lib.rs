//! Solar Quote - Deterministic protocol-deposit and carbon-credit quotes for proposed solar farms
//!
//! This library provides:
//! - Region resolution from coordinates and regional escalator rates
//! - Protocol deposit valuation (growing annuity and monthly NPV)
//! - Carbon credit, carbon debt and net-credit accounting
//! - Fixed-point encoding and the farm efficiency score
//! - Quote orchestration with a typed debug trace
//! - Parallel batch requoting of stored quotes

pub mod assumptions;
pub mod carbon;
pub mod efficiency;
pub mod error;
pub mod geography;
pub mod quote;
pub mod runner;
pub mod valuation;

// Re-export commonly used types
pub use assumptions::ProtocolAssumptions;
pub use error::{QuoteError, Result};
pub use geography::{Coordinates, EscalatorTable, RegionTable};
pub use quote::{compute_quote, Overrides, QuoteConfig, QuoteEngine, QuoteInputs, QuoteResult, RawQuoteInputs};
pub use runner::{QuoteRunner, RequoteOutcome, StoredQuote};
pub use valuation::PresentValueMethod;
