//! Unsigned settlement transaction construction
//!
//! Builders return unsigned instructions/transactions; signing and
//! submission belong to the caller's wallet. A batched unstake or claim
//! lists every ledger-record account in its nonce range, which is what
//! bounds the batch width.

use crate::domain::pool::PoolParameters;
use crate::infrastructure::ledger::accounts::{
    ledger_counter_address, pool_vault_address, stake_record_address, unstake_record_address,
};
use crate::shared::errors::StakingError;
use crate::shared::types::{NonceRange, RawAmount};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;

/// Instruction data understood by the staking program
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum StakingInstructionData {
    Stake {
        amount: u64,
    },
    Unstake {
        amount: u64,
        start_nonce: u64,
        end_nonce: u64,
    },
    Claim {
        start_nonce: u64,
        end_nonce: u64,
    },
}

fn chain_amount(amount: RawAmount) -> Result<u64, StakingError> {
    amount
        .try_into()
        .map_err(|_| StakingError::InvalidAmount(format!("amount {amount} exceeds u64 range")))
}

fn instruction_data(data: &StakingInstructionData) -> Vec<u8> {
    data.try_to_vec().expect("borsh serialization of instruction data")
}

/// Delegate approval letting the pool vault pull the stake amount from the
/// owner's token account. Returns None when no approval is needed.
pub fn build_approve_instruction(
    program_id: &Pubkey,
    params: &PoolParameters,
    owner: &Pubkey,
    amount: RawAmount,
    current_allowance: RawAmount,
) -> Result<Option<Instruction>, StakingError> {
    if current_allowance >= amount {
        return Ok(None);
    }
    let amount = chain_amount(amount)?;
    let source = get_associated_token_address(owner, &params.token_mint);
    let delegate = pool_vault_address(program_id, &params.pool_address);
    let instruction = spl_token::instruction::approve(
        &spl_token::id(),
        &source,
        &delegate,
        owner,
        &[],
        amount,
    )
    .map_err(|e| StakingError::InvalidAmount(format!("approve instruction: {e}")))?;
    Ok(Some(instruction))
}

/// Stake `amount` into the pool; creates the record at `next_stake_nonce`.
pub fn build_stake_instruction(
    program_id: &Pubkey,
    params: &PoolParameters,
    owner: &Pubkey,
    amount: RawAmount,
    next_stake_nonce: u64,
) -> Result<Instruction, StakingError> {
    let amount = chain_amount(amount)?;
    let pool = &params.pool_address;
    let accounts = vec![
        AccountMeta::new(*pool, false),
        AccountMeta::new(pool_vault_address(program_id, pool), false),
        AccountMeta::new(get_associated_token_address(owner, &params.token_mint), false),
        AccountMeta::new(ledger_counter_address(program_id, pool, owner), false),
        AccountMeta::new(
            stake_record_address(program_id, pool, owner, next_stake_nonce),
            false,
        ),
        AccountMeta::new(*owner, true),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    Ok(Instruction::new_with_bytes(
        *program_id,
        &instruction_data(&StakingInstructionData::Stake { amount }),
        accounts,
    ))
}

/// Batched unstake against the stake records in `range`; creates the
/// unstake record at `next_unstake_nonce`.
pub fn build_unstake_instruction(
    program_id: &Pubkey,
    params: &PoolParameters,
    owner: &Pubkey,
    amount: RawAmount,
    range: &NonceRange,
    next_unstake_nonce: u64,
) -> Result<Instruction, StakingError> {
    let amount = chain_amount(amount)?;
    let pool = &params.pool_address;
    let mut accounts = vec![
        AccountMeta::new(*pool, false),
        AccountMeta::new(ledger_counter_address(program_id, pool, owner), false),
        AccountMeta::new(
            unstake_record_address(program_id, pool, owner, next_unstake_nonce),
            false,
        ),
        AccountMeta::new(*owner, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(
        range
            .nonces()
            .map(|nonce| AccountMeta::new(stake_record_address(program_id, pool, owner, nonce), false)),
    );
    Ok(Instruction::new_with_bytes(
        *program_id,
        &instruction_data(&StakingInstructionData::Unstake {
            amount,
            start_nonce: range.start,
            end_nonce: range.end,
        }),
        accounts,
    ))
}

/// Batched claim of the unstake records in `range`; pays out to the
/// owner's token account.
pub fn build_claim_instruction(
    program_id: &Pubkey,
    params: &PoolParameters,
    owner: &Pubkey,
    range: &NonceRange,
) -> Result<Instruction, StakingError> {
    let pool = &params.pool_address;
    let mut accounts = vec![
        AccountMeta::new(*pool, false),
        AccountMeta::new(pool_vault_address(program_id, pool), false),
        AccountMeta::new(get_associated_token_address(owner, &params.token_mint), false),
        AccountMeta::new(*owner, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];
    accounts.extend(
        range
            .nonces()
            .map(|nonce| AccountMeta::new(unstake_record_address(program_id, pool, owner, nonce), false)),
    );
    Ok(Instruction::new_with_bytes(
        *program_id,
        &instruction_data(&StakingInstructionData::Claim {
            start_nonce: range.start,
            end_nonce: range.end,
        }),
        accounts,
    ))
}

/// Assemble an unsigned transaction; the wallet signs with a fresh
/// blockhash before submission.
pub fn build_transaction(instructions: &[Instruction], payer: &Pubkey) -> Transaction {
    Transaction::new_with_payer(instructions, Some(payer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::{LockPeriod, PoolSelector, TokenKind};

    fn params() -> PoolParameters {
        PoolParameters {
            selector: PoolSelector::new(TokenKind::Base, LockPeriod::Days90),
            pool_address: Pubkey::new_unique(),
            share_mint: Pubkey::new_unique(),
            token_mint: Pubkey::new_unique(),
            decimals: 9,
            lock_seconds: 90 * 86_400,
            claim_delay_seconds: 86_400,
        }
    }

    #[test]
    fn test_instruction_data_layout() {
        let data = StakingInstructionData::Unstake {
            amount: 500,
            start_nonce: 3,
            end_nonce: 7,
        };
        let bytes = data.try_to_vec().unwrap();
        // variant tag + three little-endian u64s
        assert_eq!(bytes.len(), 1 + 8 + 8 + 8);
        assert_eq!(bytes[0], 1);
        assert_eq!(StakingInstructionData::try_from_slice(&bytes).unwrap(), data);
    }

    #[test]
    fn test_stake_instruction_accounts() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let params = params();

        let instruction =
            build_stake_instruction(&program_id, &params, &owner, 1_000, 4).unwrap();

        assert_eq!(instruction.program_id, program_id);
        assert_eq!(instruction.accounts.len(), 8);
        assert_eq!(instruction.accounts[0].pubkey, params.pool_address);
        assert_eq!(
            instruction.accounts[4].pubkey,
            stake_record_address(&program_id, &params.pool_address, &owner, 4)
        );
        assert!(instruction.accounts[5].is_signer);
        assert_eq!(
            instruction.data,
            StakingInstructionData::Stake { amount: 1_000 }.try_to_vec().unwrap()
        );
    }

    #[test]
    fn test_unstake_instruction_lists_every_record_in_range() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let params = params();
        let range = NonceRange { start: 2, end: 5 };

        let instruction =
            build_unstake_instruction(&program_id, &params, &owner, 750, &range, 1).unwrap();

        // 5 fixed accounts + one per nonce in the range
        assert_eq!(instruction.accounts.len(), 5 + 4);
        for (offset, nonce) in range.nonces().enumerate() {
            assert_eq!(
                instruction.accounts[5 + offset].pubkey,
                stake_record_address(&program_id, &params.pool_address, &owner, nonce)
            );
        }
        assert_eq!(
            instruction.data,
            StakingInstructionData::Unstake {
                amount: 750,
                start_nonce: 2,
                end_nonce: 5
            }
            .try_to_vec()
            .unwrap()
        );
    }

    #[test]
    fn test_claim_instruction_references_unstake_records() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let params = params();
        let range = NonceRange { start: 0, end: 1 };

        let instruction = build_claim_instruction(&program_id, &params, &owner, &range).unwrap();

        assert_eq!(instruction.accounts.len(), 5 + 2);
        assert_eq!(
            instruction.accounts[5].pubkey,
            unstake_record_address(&program_id, &params.pool_address, &owner, 0)
        );
    }

    #[test]
    fn test_approve_skipped_when_allowance_covers() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let params = params();

        let instruction =
            build_approve_instruction(&program_id, &params, &owner, 100, 100).unwrap();
        assert!(instruction.is_none());

        let instruction =
            build_approve_instruction(&program_id, &params, &owner, 100, 99).unwrap();
        let instruction = instruction.unwrap();
        assert_eq!(instruction.program_id, spl_token::id());
    }

    #[test]
    fn test_amount_over_u64_is_rejected() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let params = params();

        let err = build_stake_instruction(
            &program_id,
            &params,
            &owner,
            u128::from(u64::MAX) + 1,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, StakingError::InvalidAmount(_)));
    }

    #[test]
    fn test_unsigned_transaction_has_payer() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let params = params();
        let instruction =
            build_stake_instruction(&program_id, &params, &owner, 10, 0).unwrap();

        let tx = build_transaction(&[instruction], &owner);
        assert_eq!(tx.message.account_keys[0], owner);
        assert!(tx.signatures.iter().all(|s| *s == Default::default()));
    }
}
