//! Deposit valuation: present-value methods, the spreadsheet protocol-fee
//! estimate and fixed-point encoding of the resulting amounts

pub mod fixed_point;
mod present_value;
mod protocol_fee;

pub use present_value::{
    annual_energy_kwh, growing_annuity, monthly_npv, monthly_rate, spreadsheet_pv,
    PresentValueMethod, DEGENERATE_RATE_TOLERANCE,
};
pub use protocol_fee::{estimate_protocol_fees, ProtocolFeeEstimate, ProtocolFeeInputs};
