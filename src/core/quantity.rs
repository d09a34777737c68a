//! Parsing of sold quantities.
//!
//! Quantities are typed in by hand at the end of a day and may be whole
//! numbers, decimals or simple fractions such as `1/4` for partial items.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A quantity as it was recorded on a sale: either a plain number or the
/// original text (kept verbatim so that `3/4` stays `3/4` in reports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantitySold {
    Number(f64),
    Text(String),
}

impl QuantitySold {
    /// Builds the stored form from user input. Fractions are stored as text,
    /// anything else as a number.
    pub fn from_input(input: &str) -> Result<Self, QuantityError> {
        let input = input.trim();
        let value = parse_strict(input)?;
        if input.contains('/') {
            Ok(QuantitySold::Text(input.to_string()))
        } else {
            Ok(QuantitySold::Number(value))
        }
    }

    /// Numeric value of the quantity. Malformed text counts as zero.
    pub fn value(&self) -> f64 {
        match self {
            QuantitySold::Number(n) => *n,
            QuantitySold::Text(s) => parse_lenient(s),
        }
    }
}

impl Default for QuantitySold {
    fn default() -> Self {
        QuantitySold::Number(0.0)
    }
}

impl Display for QuantitySold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantitySold::Number(n) => write!(f, "{n}"),
            QuantitySold::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantityError {
    #[error("'{0}' is not a number or fraction")]
    Malformed(String),
    #[error("'{0}' has a zero denominator")]
    ZeroDenominator(String),
    #[error("'{0}' is negative")]
    Negative(String),
}

/// Parses a quantity, rejecting anything that is not a non-negative number or
/// `numerator/denominator` fraction. Empty input is zero.
pub fn parse_strict(input: &str) -> Result<f64, QuantityError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0.0);
    }

    let value = match input.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num
                .trim()
                .parse()
                .map_err(|_| QuantityError::Malformed(input.to_string()))?;
            let den: f64 = den
                .trim()
                .parse()
                .map_err(|_| QuantityError::Malformed(input.to_string()))?;
            if den == 0.0 {
                return Err(QuantityError::ZeroDenominator(input.to_string()));
            }
            num / den
        }
        None => input
            .parse::<f64>()
            .map_err(|_| QuantityError::Malformed(input.to_string()))?,
    };

    if !value.is_finite() {
        return Err(QuantityError::Malformed(input.to_string()));
    }
    if value < 0.0 {
        return Err(QuantityError::Negative(input.to_string()));
    }
    Ok(value)
}

/// Parses a quantity for display and aggregation. Never fails: malformed
/// input, zero denominators and negative values all count as zero.
pub fn parse_lenient(input: &str) -> f64 {
    parse_strict(input).unwrap_or(0.0)
}
