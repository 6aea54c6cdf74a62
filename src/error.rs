//! Error types for quote computation
//!
//! Only two conditions reach the caller as computation failures: rejected
//! inputs and non-finite results. Missing regions and `r == g` in the
//! growing annuity are absorbed by fallbacks and never surface here.

use thiserror::Error;

/// Errors produced while ingesting inputs or computing a quote
#[derive(Debug, Error)]
pub enum QuoteError {
    /// A required numeric field was missing, non-finite, non-positive or out of range
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    /// A decimal string could not be parsed
    #[error("could not parse `{field}` from {value:?}")]
    Parse {
        field: &'static str,
        value: String,
    },

    /// A computed quantity evaluated to NaN or infinity
    #[error("computation produced a non-finite `{field}` ({value})")]
    NonFiniteResult {
        field: &'static str,
        value: f64,
    },

    /// A value could not be represented at the requested fixed-point scale
    #[error("`{field}` ({value}) does not fit a {decimals}-decimal fixed-point integer")]
    Overflow {
        field: &'static str,
        value: f64,
        decimals: u32,
    },

    /// A table or assumption file was malformed
    #[error("invalid table `{table}`: {reason}")]
    Table {
        table: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl QuoteError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        QuoteError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// True for failures the caller should report as a bad request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QuoteError::InvalidInput { .. } | QuoteError::Parse { .. }
        )
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Reject NaN and infinite values for a named quantity
pub fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QuoteError::NonFiniteResult { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("deposit", 12.5).unwrap(), 12.5);
        assert!(matches!(
            ensure_finite("deposit", f64::NAN),
            Err(QuoteError::NonFiniteResult { field: "deposit", .. })
        ));
        assert!(ensure_finite("deposit", f64::INFINITY).is_err());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(QuoteError::invalid("price", "must be positive").is_client_error());
        let err = QuoteError::NonFiniteResult {
            field: "weekly_debt",
            value: f64::NAN,
        };
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("weekly_debt"));
    }
}
