//! Integer fixed-point encoding for currency (6 decimals) and impact assets (18 decimals)

use crate::error::{QuoteError, Result};

/// Decimals used for USD amounts
pub const USD_DECIMALS: u32 = 6;

/// Decimals used for impact-asset amounts (WAD)
pub const WAD_DECIMALS: u32 = 18;

fn scale(decimals: u32) -> f64 {
    10f64.powi(decimals as i32)
}

/// `round(value * 10^decimals)` as an exact integer
pub fn encode_fixed(field: &'static str, value: f64, decimals: u32) -> Result<i128> {
    if !value.is_finite() {
        return Err(QuoteError::NonFiniteResult { field, value });
    }
    let scaled = (value * scale(decimals)).round();
    // i128::MAX as f64 rounds up to 2^127, which is itself out of range
    if scaled.abs() >= i128::MAX as f64 {
        return Err(QuoteError::Overflow {
            field,
            value,
            decimals,
        });
    }
    Ok(scaled as i128)
}

/// Decode an integer fixed-point string back to a float
pub fn decode_fixed(field: &'static str, raw: &str, decimals: u32) -> Result<f64> {
    let units: i128 = raw.trim().parse().map_err(|_| QuoteError::Parse {
        field,
        value: raw.to_string(),
    })?;
    Ok(units as f64 / scale(decimals))
}

pub fn encode_usd6(field: &'static str, amount: f64) -> Result<i128> {
    encode_fixed(field, amount, USD_DECIMALS)
}

pub fn encode_wad(field: &'static str, amount: f64) -> Result<i128> {
    encode_fixed(field, amount, WAD_DECIMALS)
}

pub fn decode_usd6(raw: &str) -> Result<f64> {
    decode_fixed("usd6", raw, USD_DECIMALS)
}

pub fn decode_wad(raw: &str) -> Result<f64> {
    decode_fixed("wad", raw, WAD_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_encode_rounds_to_nearest() {
        assert_eq!(encode_usd6("x", 1.234_567_8).unwrap(), 1_234_568);
        assert_eq!(encode_usd6("x", 1.234_567_2).unwrap(), 1_234_567);
        assert_eq!(encode_usd6("x", 33_512.25).unwrap(), 33_512_250_000);
        assert_eq!(encode_usd6("x", 0.0).unwrap(), 0);
    }

    #[test]
    fn test_wad_scale() {
        assert_eq!(encode_wad("x", 1.0).unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(encode_wad("x", 0.5).unwrap(), 500_000_000_000_000_000);
    }

    #[test]
    fn test_round_trip_within_a_micro_dollar() {
        for amount in [0.01, 1.5, 999.999_999, 33_847.123_456_7, 1_234_567.891, 98_765_432.1] {
            let encoded = encode_usd6("deposit", amount).unwrap();
            let decoded = decode_usd6(&encoded.to_string()).unwrap();
            assert_abs_diff_eq!(decoded, amount, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rejects_non_finite_and_huge() {
        assert!(matches!(
            encode_wad("impact", f64::NAN),
            Err(QuoteError::NonFiniteResult { .. })
        ));
        assert!(matches!(
            encode_wad("impact", 1e30),
            Err(QuoteError::Overflow { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_usd6("12.5").is_err());
        assert!(decode_wad("abc").is_err());
        assert_eq!(decode_usd6(" 2500000 ").unwrap(), 2.5);
    }
}
