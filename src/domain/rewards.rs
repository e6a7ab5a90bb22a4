//! Reward rate scaling for display

use crate::domain::amount::{round_display, to_decimal};
use crate::shared::types::RawAmount;

/// Fixed-point scale used by the pool's reward rate
pub const RATE_SCALE_DECIMALS: u32 = 18;

/// Display precision for percentages
const RATE_DISPLAY_PRECISION: u32 = 3;

const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0;

/// Scale a raw fixed-point rate into a rounded display percentage.
///
/// The raw rate stays in the integer domain until the final display
/// conversion; rounding happens exactly once, at the end.
pub fn rate_to_percentage(raw_rate: RawAmount, rate_scale_decimals: u32) -> f64 {
    round_display(
        to_decimal(raw_rate, rate_scale_decimals) * 100.0,
        RATE_DISPLAY_PRECISION,
    )
}

/// Annualized reward percentage from rewards accrued so far.
///
/// Zero stake or zero elapsed time yields 0.0 rather than dividing by zero.
pub fn annualized_percentage(
    reward_so_far: RawAmount,
    total_staked: RawAmount,
    elapsed_seconds: u64,
) -> f64 {
    if total_staked == 0 || elapsed_seconds == 0 {
        return 0.0;
    }
    let ratio = reward_so_far as f64 / total_staked as f64;
    round_display(
        ratio * (SECONDS_PER_YEAR / elapsed_seconds as f64) * 100.0,
        RATE_DISPLAY_PRECISION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_to_percentage() {
        assert_eq!(rate_to_percentage(152_300_000_000_000_000, 18), 15.23);
        assert_eq!(rate_to_percentage(0, 18), 0.0);
        assert_eq!(rate_to_percentage(1_000_000_000_000_000_000, 18), 100.0);
    }

    #[test]
    fn test_rate_to_percentage_rounds_to_three_decimals() {
        // 0.0123456 -> 1.23456% -> 1.235%
        assert_eq!(rate_to_percentage(12_345_600_000_000_000, 18), 1.235);
    }

    #[test]
    fn test_annualized_percentage() {
        // 5 tokens of reward on 1000 staked over half a year -> 1% APR
        let half_year = 365 * 24 * 60 * 60 / 2;
        assert_eq!(annualized_percentage(5_000, 1_000_000, half_year), 1.0);
    }

    #[test]
    fn test_annualized_percentage_guards() {
        assert_eq!(annualized_percentage(5_000, 0, 1000), 0.0);
        assert_eq!(annualized_percentage(5_000, 1_000_000, 0), 0.0);
    }
}
