//! Token / pool-share conversion through the pool's integer exchange ratio

use crate::shared::types::RawAmount;

/// Convert a token amount into pool shares at the current ratio.
///
/// An empty pool converts 1:1. Operands are widened u64 chain amounts, so
/// the intermediate product fits u128.
pub fn token_to_shares(
    token_amount: RawAmount,
    total_staked: RawAmount,
    share_supply: RawAmount,
) -> RawAmount {
    if total_staked == 0 || share_supply == 0 {
        return token_amount;
    }
    token_amount * share_supply / total_staked
}

/// Convert pool shares back into the underlying token amount.
pub fn shares_to_token(
    share_amount: RawAmount,
    total_staked: RawAmount,
    share_supply: RawAmount,
) -> RawAmount {
    if total_staked == 0 || share_supply == 0 {
        return share_amount;
    }
    share_amount * total_staked / share_supply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_converts_one_to_one() {
        assert_eq!(token_to_shares(500, 0, 0), 500);
        assert_eq!(shares_to_token(500, 0, 0), 500);
    }

    #[test]
    fn test_conversion_at_unit_ratio() {
        assert_eq!(token_to_shares(1_000, 10_000, 10_000), 1_000);
        assert_eq!(shares_to_token(1_000, 10_000, 10_000), 1_000);
    }

    #[test]
    fn test_conversion_at_skewed_ratio() {
        // rewards accrued: 12000 tokens back 10000 shares
        assert_eq!(token_to_shares(600, 12_000, 10_000), 500);
        assert_eq!(shares_to_token(500, 12_000, 10_000), 600);
    }

    #[test]
    fn test_conversion_truncates_remainders() {
        // 1 token at a 3:2 ratio is 0 whole shares
        assert_eq!(token_to_shares(1, 3, 2), 0);
        assert_eq!(shares_to_token(1, 3, 2), 1);
    }
}
