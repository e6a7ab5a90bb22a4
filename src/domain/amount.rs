//! Fixed-point conversion between raw ledger amounts and display amounts

use crate::shared::errors::StakingError;
use crate::shared::types::RawAmount;

/// Upper bound on pool decimals; keeps `10^decimals` inside u128
pub const MAX_DECIMALS: u32 = 36;

/// Default rounding precision for display values
pub const DISPLAY_PRECISION: u32 = 4;

/// Convert a display amount into the pool's smallest unit, truncating
/// toward zero past `decimals` fractional digits.
///
/// Scaling goes through the shortest decimal rendering of the input and
/// never through a float multiply: `2.9 * 10.0` is `28.999…` in binary
/// floating point and would truncate to 28.
pub fn to_raw(amount: f64, decimals: u32) -> Result<RawAmount, StakingError> {
    if decimals > MAX_DECIMALS {
        return Err(StakingError::InvalidAmount(format!(
            "decimals {decimals} out of range 0..={MAX_DECIMALS}"
        )));
    }
    if !amount.is_finite() {
        return Err(StakingError::InvalidAmount(format!(
            "amount {amount} is not finite"
        )));
    }
    if amount < 0.0 {
        return Err(StakingError::InvalidAmount(format!(
            "amount {amount} is negative"
        )));
    }
    if amount == 0.0 {
        return Ok(0);
    }

    // Display for f64 always renders plain decimal notation and round-trips
    // the value exactly.
    let text = format!("{amount}");
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (text.as_str(), ""),
    };

    let kept = frac_part.len().min(decimals as usize);
    let mut digits = String::with_capacity(int_part.len() + kept);
    digits.push_str(int_part);
    digits.push_str(&frac_part[..kept]);

    let value: RawAmount = digits.parse().map_err(|_| {
        StakingError::InvalidAmount(format!("amount {amount} does not fit the raw domain"))
    })?;
    let scale = 10u128.pow(decimals - kept as u32);
    value.checked_mul(scale).ok_or_else(|| {
        StakingError::InvalidAmount(format!("amount {amount} does not fit the raw domain"))
    })
}

/// Convert a raw amount into a display value. Lossy past f64 precision;
/// used for display only, never for eligibility or ordering.
///
/// Renders the exact decimal and parses it, so the nearest representable
/// display value is produced even where `10^decimals` itself is not exact
/// in binary floating point.
pub fn to_decimal(raw: RawAmount, decimals: u32) -> f64 {
    if decimals == 0 {
        return raw as f64;
    }
    let digits = raw.to_string();
    let width = decimals as usize;
    let text = if digits.len() > width {
        let split = digits.len() - width;
        format!("{}.{}", &digits[..split], &digits[split..])
    } else {
        format!("0.{digits:0>width$}")
    };
    text.parse().expect("constructed decimal literal")
}

/// Round a display value. Never used to decide eligibility or ordering.
pub fn round_display(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_raw_whole_amounts() {
        assert_eq!(to_raw(0.0, 18).unwrap(), 0);
        assert_eq!(to_raw(1.0, 9).unwrap(), 1_000_000_000);
        assert_eq!(to_raw(42.0, 0).unwrap(), 42);
    }

    #[test]
    fn test_to_raw_fractional_amounts() {
        assert_eq!(to_raw(0.5, 9).unwrap(), 500_000_000);
        assert_eq!(to_raw(123.456, 6).unwrap(), 123_456_000);
        // the float-multiply trap: 2.9 * 10.0 == 28.999999999999996
        assert_eq!(to_raw(2.9, 1).unwrap(), 29);
        assert_eq!(to_raw(0.1, 18).unwrap(), 100_000_000_000_000_000);
    }

    #[test]
    fn test_to_raw_truncates_toward_zero() {
        // fractional digits past the pool's precision are dropped, not rounded
        assert_eq!(to_raw(1.2345, 2).unwrap(), 123);
        assert_eq!(to_raw(0.9999, 0).unwrap(), 0);
    }

    #[test]
    fn test_to_raw_rejects_invalid_input() {
        assert!(to_raw(-1.0, 9).is_err());
        assert!(to_raw(f64::NAN, 9).is_err());
        assert!(to_raw(f64::INFINITY, 9).is_err());
        assert!(to_raw(1.0, MAX_DECIMALS + 1).is_err());
        // 10^300-ish integer part overflows u128
        assert!(to_raw(1e300, 0).is_err());
    }

    #[test]
    fn test_round_trip_integer_sourced_values() {
        // to_raw(to_decimal(r, d), d) == r for raw values inside f64's
        // exact-integer range
        for d in [0u32, 1, 6, 9, 12, 18, 36] {
            for r in [0u128, 1, 29, 1_000, 123_456_789, 999_999_999_999_999] {
                let display = to_decimal(r, d);
                assert_eq!(to_raw(display, d).unwrap(), r, "r={r} d={d}");
            }
        }
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(1_500_000_000, 9), 1.5);
        assert_eq!(to_decimal(0, 18), 0.0);
    }

    #[test]
    fn test_round_display() {
        assert_eq!(round_display(1.23456, DISPLAY_PRECISION), 1.2346);
        assert_eq!(round_display(1.23454, DISPLAY_PRECISION), 1.2345);
        assert_eq!(round_display(15.229999999999999, 3), 15.23);
    }
}
