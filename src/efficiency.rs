//! Farm efficiency score from fixed-point deposit and impact amounts
//!
//! The score is weekly impact assets per USD of protocol deposit. Both inputs
//! are integers (USD at 6 decimals, impact at 18 decimals) and the ratio is
//! taken in integer arithmetic at 18-decimal precision, so the score depends
//! only on the two encoded amounts.

use crate::error::{QuoteError, Result};
use crate::valuation::fixed_point::{USD_DECIMALS, WAD_DECIMALS};

const WAD: i128 = 1_000_000_000_000_000_000;

fn pow10(exp: u32) -> i128 {
    10i128.pow(exp)
}

/// Weekly impact assets per USD deposited, as an 18-decimal integer
pub fn efficiency_wad(deposit_usd6: i128, weekly_impact_wad: i128) -> Result<i128> {
    if deposit_usd6 <= 0 {
        return Err(QuoteError::invalid(
            "protocol_deposit_usd6",
            format!("deposit {} rounds to zero at 6 decimals; no efficiency ratio exists", deposit_usd6),
        ));
    }
    if weekly_impact_wad < 0 {
        return Err(QuoteError::invalid("weekly_impact_assets", "must not be negative"));
    }

    let overflow = QuoteError::Overflow {
        field: "efficiency_score",
        value: weekly_impact_wad as f64,
        decimals: WAD_DECIMALS,
    };

    // impact / 1e18 per (deposit / 1e6) USD, rescaled to 18 decimals, rounded half up
    let numerator = weekly_impact_wad
        .checked_mul(pow10(USD_DECIMALS))
        .and_then(|n| n.checked_add(deposit_usd6 / 2))
        .ok_or(overflow)?;

    Ok(numerator / deposit_usd6)
}

/// Efficiency score as a float, derived from the exact integer ratio
pub fn efficiency_score(deposit_usd6: i128, weekly_impact_wad: i128) -> Result<f64> {
    let ratio = efficiency_wad(deposit_usd6, weekly_impact_wad)?;
    let whole = ratio / WAD;
    let fraction = ratio % WAD;
    Ok(whole as f64 + fraction as f64 / WAD as f64)
}
