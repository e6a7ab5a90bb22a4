//! Staking program account structures and address derivation

use crate::shared::types::{PoolState, StakePosition, UnstakePosition};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

/// PDA seed for the per-account ledger counters
pub const LEDGER_COUNTER_SEED: &[u8] = b"ledger_counter";
/// PDA seed for stake records
pub const STAKE_RECORD_SEED: &[u8] = b"stake_record";
/// PDA seed for unstake records
pub const UNSTAKE_RECORD_SEED: &[u8] = b"unstake_record";
/// PDA seed for the pool's token vault
pub const POOL_VAULT_SEED: &[u8] = b"pool_vault";

/// Pool state account
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolStateAccount {
    pub start_time: u64,
    pub total_staked: u64,
    pub total_unstaked: u64,
    pub share_supply: u64,
    /// Fixed-point reward rate, scaled by 10^18
    pub reward_rate: u128,
    pub current_reward: u64,
    pub staking_paused: bool,
    pub claim_paused: bool,
}

impl PoolStateAccount {
    pub fn into_state(self) -> PoolState {
        PoolState {
            start_time: self.start_time,
            total_staked: u128::from(self.total_staked),
            total_unstaked: u128::from(self.total_unstaked),
            share_supply: u128::from(self.share_supply),
            reward_rate: self.reward_rate,
            current_reward: u128::from(self.current_reward),
            staking_paused: self.staking_paused,
            claim_paused: self.claim_paused,
        }
    }
}

/// Per-account ledger counters. The next stake record gets nonce
/// `stake_count`, the next unstake record `unstake_count`.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerCounterAccount {
    pub stake_count: u64,
    pub unstake_count: u64,
}

/// One stake record, immutable except for `share_remaining`
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct StakeRecordAccount {
    pub staked_time: u64,
    pub token_amount: u64,
    pub share_amount: u64,
    pub share_remaining: u64,
}

impl StakeRecordAccount {
    /// Widen the chain's u64 amounts into the core's u128 domain
    pub fn into_position(self, index: u64) -> StakePosition {
        StakePosition {
            index,
            staked_at: self.staked_time,
            token_amount: u128::from(self.token_amount),
            pool_share_amount: u128::from(self.share_amount),
            pool_share_remaining: u128::from(self.share_remaining),
        }
    }
}

/// One unstake record; `claim_time` stays zero until claimed
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct UnstakeRecordAccount {
    pub unstake_time: u64,
    pub share_amount: u64,
    pub token_amount: u64,
    pub token_remaining: u64,
    pub claim_time: u64,
}

impl UnstakeRecordAccount {
    pub fn into_position(self, index: u64) -> UnstakePosition {
        UnstakePosition {
            index,
            unstaked_at: self.unstake_time,
            pool_share_amount: u128::from(self.share_amount),
            token_amount: u128::from(self.token_amount),
            token_remaining: u128::from(self.token_remaining),
            claimed_at: self.claim_time,
        }
    }
}

pub fn ledger_counter_address(program_id: &Pubkey, pool: &Pubkey, owner: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[LEDGER_COUNTER_SEED, pool.as_ref(), owner.as_ref()],
        program_id,
    )
    .0
}

pub fn stake_record_address(
    program_id: &Pubkey,
    pool: &Pubkey,
    owner: &Pubkey,
    nonce: u64,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            STAKE_RECORD_SEED,
            pool.as_ref(),
            owner.as_ref(),
            &nonce.to_le_bytes(),
        ],
        program_id,
    )
    .0
}

pub fn unstake_record_address(
    program_id: &Pubkey,
    pool: &Pubkey,
    owner: &Pubkey,
    nonce: u64,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            UNSTAKE_RECORD_SEED,
            pool.as_ref(),
            owner.as_ref(),
            &nonce.to_le_bytes(),
        ],
        program_id,
    )
    .0
}

pub fn pool_vault_address(program_id: &Pubkey, pool: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[POOL_VAULT_SEED, pool.as_ref()], program_id).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stake_record_roundtrip() {
        let record = StakeRecordAccount {
            staked_time: 1_700_000_000,
            token_amount: 5_000_000_000,
            share_amount: 4_800_000_000,
            share_remaining: 1_200_000_000,
        };
        let bytes = record.try_to_vec().unwrap();
        let decoded = StakeRecordAccount::try_from_slice(&bytes).unwrap();
        assert_eq!(decoded, record);

        let position = decoded.into_position(7);
        assert_eq!(position.index, 7);
        assert_eq!(position.pool_share_remaining, 1_200_000_000);
    }

    #[test]
    fn test_unstake_record_claim_time_defaults_to_zero() {
        let record = UnstakeRecordAccount {
            unstake_time: 1_700_000_000,
            share_amount: 100,
            token_amount: 110,
            token_remaining: 110,
            claim_time: 0,
        };
        let position = record.into_position(0);
        assert_eq!(position.claimed_at, 0);
        assert_eq!(position.token_remaining, 110);
    }

    #[test]
    fn test_record_addresses_are_distinct_per_nonce() {
        let program_id = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let first = stake_record_address(&program_id, &pool, &owner, 0);
        let second = stake_record_address(&program_id, &pool, &owner, 1);
        assert_ne!(first, second);

        // derivation is deterministic
        assert_eq!(first, stake_record_address(&program_id, &pool, &owner, 0));
        // stake and unstake ledgers never collide
        assert_ne!(first, unstake_record_address(&program_id, &pool, &owner, 0));
    }

    #[test]
    fn test_truncated_account_data_is_rejected() {
        let record = PoolStateAccount {
            start_time: 1,
            total_staked: 2,
            total_unstaked: 3,
            share_supply: 4,
            reward_rate: 5,
            current_reward: 6,
            staking_paused: false,
            claim_paused: false,
        };
        let bytes = record.try_to_vec().unwrap();
        assert!(PoolStateAccount::try_from_slice(&bytes[..bytes.len() - 1]).is_err());
    }
}
