//! Common types used across the application

use serde::{Deserialize, Serialize};

/// Amount in a pool's smallest unit. On-chain records store `u64`; the
/// fetch layer widens to `u128` so pool totals never overflow while
/// accumulating. Floats never participate in comparisons or totals.
pub type RawAmount = u128;

/// Unix timestamp in seconds
pub type UnixSeconds = u64;

/// One stake event in an account's pool ledger. The index is the ledger
/// nonce: assigned in creation order, so index ascending == time ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    pub index: u64,
    pub staked_at: UnixSeconds,
    pub token_amount: RawAmount,
    pub pool_share_amount: RawAmount,
    /// Reduced by the ledger as partial unstakes settle, never increased.
    /// Invariant: `0 <= pool_share_remaining <= pool_share_amount`.
    pub pool_share_remaining: RawAmount,
}

/// One unstake event in an account's pool ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakePosition {
    pub index: u64,
    pub unstaked_at: UnixSeconds,
    pub pool_share_amount: RawAmount,
    pub token_amount: RawAmount,
    /// Invariant: `0 <= token_remaining <= token_amount`.
    pub token_remaining: RawAmount,
    /// Zero until the record has been claimed.
    pub claimed_at: UnixSeconds,
}

/// Settled claim, derived from unstake records with a non-zero claim time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEvent {
    pub claimed_at: UnixSeconds,
    pub claimed_amount: RawAmount,
}

/// Stake record annotated with eligibility against a sampled `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingRecord {
    pub index: u64,
    pub staked_at: UnixSeconds,
    pub token_amount: RawAmount,
    pub pool_share_amount: RawAmount,
    pub pool_share_remaining: RawAmount,
    pub eligible_at: UnixSeconds,
    pub is_eligible: bool,
    /// `pool_share_remaining` once the lock has elapsed, zero before.
    pub eligible_amount: RawAmount,
}

/// Unstake record annotated with claim eligibility against a sampled `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakingRecord {
    pub index: u64,
    pub unstaked_at: UnixSeconds,
    pub pool_share_amount: RawAmount,
    pub token_amount: RawAmount,
    pub token_remaining: RawAmount,
    pub eligible_at: UnixSeconds,
    pub is_eligible: bool,
    pub eligible_amount: RawAmount,
}

/// Point-in-time aggregate over all stake records of one account in one
/// pool. Pure function of (records, now, parameters); never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingSummary {
    pub records: Vec<StakingRecord>,
    pub total_token_amount: RawAmount,
    pub total_pool_share: RawAmount,
    pub total_remaining: RawAmount,
    pub total_locked: RawAmount,
    pub total_eligible: RawAmount,
}

/// Point-in-time aggregate over all unstake records of one account in one
/// pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakingSummary {
    pub records: Vec<UnstakingRecord>,
    pub total_token_amount: RawAmount,
    pub total_pool_share: RawAmount,
    pub total_remaining: RawAmount,
    pub total_locked: RawAmount,
    pub total_eligible: RawAmount,
}

/// Aggregate over settled claims of one account in one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub records: Vec<ClaimEvent>,
    pub total_claimed: RawAmount,
}

/// Contiguous, inclusive range of ledger indices referenced by one batched
/// settlement transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceRange {
    pub start: u64,
    pub end: u64,
}

impl NonceRange {
    /// Number of ledger indices the range spans, ineligible gaps included
    pub fn width(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn nonces(&self) -> impl Iterator<Item = u64> {
        self.start..=self.end
    }
}

/// Snapshot of a pool's on-chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub start_time: UnixSeconds,
    pub total_staked: RawAmount,
    pub total_unstaked: RawAmount,
    pub share_supply: RawAmount,
    /// Fixed-point reward rate, scaled by 10^18
    pub reward_rate: RawAmount,
    pub current_reward: RawAmount,
    pub staking_paused: bool,
    pub claim_paused: bool,
}
