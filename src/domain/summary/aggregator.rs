//! Summary aggregation over an account's pool ledger
//!
//! All summaries are pure functions of (records, now, parameters). The
//! caller samples `now` exactly once per query and the same value is
//! applied to every record, so classification stays internally consistent
//! however long the scan takes.

use crate::domain::pool::PoolParameters;
use crate::shared::types::{
    ClaimEvent, ClaimSummary, StakePosition, StakingRecord, StakingSummary, UnixSeconds,
    UnstakePosition, UnstakingRecord, UnstakingSummary,
};

/// Classify and total an account's stake records.
///
/// Single linear pass; totals accumulate in the integer domain.
/// `total_locked + total_eligible == total_remaining` holds exactly.
pub fn compute_staking_summary(
    positions: &[StakePosition],
    now: UnixSeconds,
    params: &PoolParameters,
) -> StakingSummary {
    let mut records = Vec::with_capacity(positions.len());
    let mut total_token_amount = 0u128;
    let mut total_pool_share = 0u128;
    let mut total_remaining = 0u128;
    let mut total_eligible = 0u128;

    for position in positions {
        let eligible_at = position.staked_at.saturating_add(params.lock_seconds);
        let is_eligible = now >= eligible_at;
        let eligible_amount = if is_eligible {
            position.pool_share_remaining
        } else {
            0
        };

        total_token_amount += position.token_amount;
        total_pool_share += position.pool_share_amount;
        total_remaining += position.pool_share_remaining;
        total_eligible += eligible_amount;

        records.push(StakingRecord {
            index: position.index,
            staked_at: position.staked_at,
            token_amount: position.token_amount,
            pool_share_amount: position.pool_share_amount,
            pool_share_remaining: position.pool_share_remaining,
            eligible_at,
            is_eligible,
            eligible_amount,
        });
    }

    StakingSummary {
        records,
        total_token_amount,
        total_pool_share,
        total_remaining,
        total_locked: total_remaining - total_eligible,
        total_eligible,
    }
}

/// Classify and total an account's unstake records against the pool's
/// claim delay. Mirrors the staking pass with token amounts in place of
/// pool-share amounts.
pub fn compute_unstaking_summary(
    positions: &[UnstakePosition],
    now: UnixSeconds,
    params: &PoolParameters,
) -> UnstakingSummary {
    let mut records = Vec::with_capacity(positions.len());
    let mut total_token_amount = 0u128;
    let mut total_pool_share = 0u128;
    let mut total_remaining = 0u128;
    let mut total_eligible = 0u128;

    for position in positions {
        let eligible_at = position.unstaked_at.saturating_add(params.claim_delay_seconds);
        let is_eligible = now >= eligible_at;
        let eligible_amount = if is_eligible {
            position.token_remaining
        } else {
            0
        };

        total_token_amount += position.token_amount;
        total_pool_share += position.pool_share_amount;
        total_remaining += position.token_remaining;
        total_eligible += eligible_amount;

        records.push(UnstakingRecord {
            index: position.index,
            unstaked_at: position.unstaked_at,
            pool_share_amount: position.pool_share_amount,
            token_amount: position.token_amount,
            token_remaining: position.token_remaining,
            eligible_at,
            is_eligible,
            eligible_amount,
        });
    }

    UnstakingSummary {
        records,
        total_token_amount,
        total_pool_share,
        total_remaining,
        total_locked: total_remaining - total_eligible,
        total_eligible,
    }
}

/// Total the settled claims: unstake records with a non-zero claim time.
pub fn compute_claim_summary(positions: &[UnstakePosition]) -> ClaimSummary {
    let mut records = Vec::new();
    let mut total_claimed = 0u128;

    for position in positions {
        if position.claimed_at == 0 {
            continue;
        }
        total_claimed += position.token_amount;
        records.push(ClaimEvent {
            claimed_at: position.claimed_at,
            claimed_amount: position.token_amount,
        });
    }

    ClaimSummary {
        records,
        total_claimed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::{LockPeriod, PoolSelector, TokenKind};
    use rand::Rng;
    use solana_sdk::pubkey::Pubkey;

    const LOCK: u64 = 1_000;
    const CLAIM_DELAY: u64 = 500;

    fn params() -> PoolParameters {
        PoolParameters {
            selector: PoolSelector::new(TokenKind::Base, LockPeriod::Days90),
            pool_address: Pubkey::new_unique(),
            share_mint: Pubkey::new_unique(),
            token_mint: Pubkey::new_unique(),
            decimals: 9,
            lock_seconds: LOCK,
            claim_delay_seconds: CLAIM_DELAY,
        }
    }

    fn stake(index: u64, staked_at: u64, amount: u128, remaining: u128) -> StakePosition {
        assert!(remaining <= amount);
        StakePosition {
            index,
            staked_at,
            token_amount: amount,
            pool_share_amount: amount,
            pool_share_remaining: remaining,
        }
    }

    fn unstake(index: u64, unstaked_at: u64, amount: u128, remaining: u128, claimed_at: u64) -> UnstakePosition {
        assert!(remaining <= amount);
        UnstakePosition {
            index,
            unstaked_at,
            pool_share_amount: amount,
            token_amount: amount,
            token_remaining: remaining,
            claimed_at,
        }
    }

    fn random_stakes(count: usize) -> Vec<StakePosition> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|i| {
                let amount = rng.gen_range(1..1_000_000u128);
                let remaining = rng.gen_range(0..=amount);
                stake(i as u64, rng.gen_range(0..5_000), amount, remaining)
            })
            .collect()
    }

    #[test]
    fn test_staking_summary_classifies_by_elapsed_lock() {
        let positions = vec![
            stake(0, 100, 1_000, 800), // eligible at 1100
            stake(1, 900, 500, 500),   // eligible at 1900
        ];

        let summary = compute_staking_summary(&positions, 1_100, &params());

        assert!(summary.records[0].is_eligible);
        assert_eq!(summary.records[0].eligible_at, 1_100);
        assert_eq!(summary.records[0].eligible_amount, 800);
        assert!(!summary.records[1].is_eligible);
        assert_eq!(summary.records[1].eligible_amount, 0);

        assert_eq!(summary.total_token_amount, 1_500);
        assert_eq!(summary.total_remaining, 1_300);
        assert_eq!(summary.total_eligible, 800);
        assert_eq!(summary.total_locked, 500);
    }

    #[test]
    fn test_staking_summary_boundary_is_inclusive() {
        // now == eligible_at counts as eligible
        let positions = vec![stake(0, 0, 100, 100)];
        let summary = compute_staking_summary(&positions, LOCK, &params());
        assert!(summary.records[0].is_eligible);

        let summary = compute_staking_summary(&positions, LOCK - 1, &params());
        assert!(!summary.records[0].is_eligible);
    }

    #[test]
    fn test_staking_summary_empty_ledger() {
        let summary = compute_staking_summary(&[], 1_000, &params());
        assert!(summary.records.is_empty());
        assert_eq!(summary.total_remaining, 0);
        assert_eq!(summary.total_eligible, 0);
        assert_eq!(summary.total_locked, 0);
    }

    #[test]
    fn test_locked_plus_eligible_equals_remaining() {
        let positions = random_stakes(200);
        for now in [0u64, 500, 1_000, 2_500, 10_000] {
            let summary = compute_staking_summary(&positions, now, &params());
            assert_eq!(
                summary.total_locked + summary.total_eligible,
                summary.total_remaining
            );
        }
    }

    #[test]
    fn test_unstaking_summary_uses_claim_delay_and_token_amounts() {
        let positions = vec![
            unstake(0, 100, 2_000, 2_000, 0), // claimable at 600
            unstake(1, 400, 1_000, 700, 0),   // claimable at 900
        ];

        let summary = compute_unstaking_summary(&positions, 600, &params());

        assert!(summary.records[0].is_eligible);
        assert_eq!(summary.records[0].eligible_amount, 2_000);
        assert!(!summary.records[1].is_eligible);
        assert_eq!(summary.total_remaining, 2_700);
        assert_eq!(summary.total_eligible, 2_000);
        assert_eq!(summary.total_locked, 700);
    }

    #[test]
    fn test_claim_summary_filters_unclaimed_records() {
        let positions = vec![
            unstake(0, 100, 2_000, 0, 700),
            unstake(1, 400, 1_000, 1_000, 0),
            unstake(2, 450, 3_000, 0, 1_000),
        ];

        let summary = compute_claim_summary(&positions);

        assert_eq!(summary.records.len(), 2);
        assert_eq!(summary.records[0].claimed_at, 700);
        assert_eq!(summary.records[0].claimed_amount, 2_000);
        assert_eq!(summary.total_claimed, 5_000);
    }

    #[test]
    fn test_claim_summary_empty_when_nothing_claimed() {
        let positions = vec![unstake(0, 100, 2_000, 2_000, 0)];
        let summary = compute_claim_summary(&positions);
        assert!(summary.records.is_empty());
        assert_eq!(summary.total_claimed, 0);
    }
}
