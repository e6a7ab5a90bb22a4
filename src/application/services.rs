//! Application services and use cases
//!
//! `StakingService` is the constructed context handed to every operation:
//! registry, fetcher and policy travel together by reference, nothing is
//! process-global. Summaries are computed from one immutable snapshot of
//! fetched records with `now` sampled exactly once per call.

use crate::application::transactions::{
    build_approve_instruction, build_claim_instruction, build_stake_instruction,
    build_transaction, build_unstake_instruction,
};
use crate::domain::amount::{round_display, to_decimal, to_raw, DISPLAY_PRECISION};
use crate::domain::pool::{
    shares_to_token, PoolParameters, PoolRegistry, PoolSelector,
};
use crate::domain::rewards::{annualized_percentage, rate_to_percentage, RATE_SCALE_DECIMALS};
use crate::domain::selection::{
    select_range, BatchOverflowPolicy, RangeSelection, UnstakeTarget, MAX_BATCH_WIDTH,
};
use crate::domain::summary::{
    compute_claim_summary, compute_staking_summary, compute_unstaking_summary,
};
use crate::infrastructure::ledger::{
    fetch_stake_positions, fetch_unstake_positions, LedgerFetcher,
};
use crate::shared::errors::StakingError;
use crate::shared::types::{
    ClaimSummary, NonceRange, PoolState, RawAmount, StakingSummary, UnixSeconds, UnstakingSummary,
};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use tracing::{debug, info};

/// Planned stake, ready to be turned into a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StakePlan {
    pub selector: PoolSelector,
    pub amount: RawAmount,
    pub next_stake_nonce: u64,
}

/// Planned batched unstake over a selected nonce range
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct UnstakePlan {
    pub selector: PoolSelector,
    pub amount: RawAmount,
    pub range: NonceRange,
    /// True when the overflow policy clamped the range; `amount` is what
    /// the clamped range actually covers.
    pub truncated: bool,
    pub next_unstake_nonce: u64,
}

/// Planned batched claim over a selected nonce range
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ClaimPlan {
    pub selector: PoolSelector,
    pub amount: RawAmount,
    pub range: NonceRange,
    pub truncated: bool,
}

/// Display-oriented view of one pool's live state
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PoolOverview {
    pub selector: PoolSelector,
    pub state: PoolState,
    pub lock_seconds: u64,
    pub claim_delay_seconds: u64,
    /// Tokens per share at the current exchange ratio, display precision
    pub share_price: f64,
    pub reward_rate_percent: f64,
    pub staker_apr_percent: f64,
}

/// Staking client facade over one configured deployment
pub struct StakingService {
    registry: PoolRegistry,
    fetcher: Arc<dyn LedgerFetcher>,
    program_id: Pubkey,
    overflow_policy: BatchOverflowPolicy,
}

impl StakingService {
    pub fn new(registry: PoolRegistry, fetcher: Arc<dyn LedgerFetcher>, program_id: Pubkey) -> Self {
        Self {
            registry,
            fetcher,
            program_id,
            overflow_policy: BatchOverflowPolicy::Reject,
        }
    }

    /// Opt in to clamping oversized settlement ranges instead of rejecting
    /// them. Clamped plans carry `truncated = true`.
    pub fn with_overflow_policy(mut self, policy: BatchOverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub async fn staking_summary(
        &self,
        selector: PoolSelector,
        owner: &Pubkey,
    ) -> Result<StakingSummary, StakingError> {
        let params = self.registry.resolve(selector)?;
        let positions =
            fetch_stake_positions(self.fetcher.as_ref(), &params.pool_address, owner).await?;
        let now = unix_now();
        Ok(compute_staking_summary(&positions, now, params))
    }

    pub async fn unstaking_summary(
        &self,
        selector: PoolSelector,
        owner: &Pubkey,
    ) -> Result<UnstakingSummary, StakingError> {
        let params = self.registry.resolve(selector)?;
        let positions =
            fetch_unstake_positions(self.fetcher.as_ref(), &params.pool_address, owner).await?;
        let now = unix_now();
        Ok(compute_unstaking_summary(&positions, now, params))
    }

    pub async fn claim_summary(
        &self,
        selector: PoolSelector,
        owner: &Pubkey,
    ) -> Result<ClaimSummary, StakingError> {
        let params = self.registry.resolve(selector)?;
        let positions =
            fetch_unstake_positions(self.fetcher.as_ref(), &params.pool_address, owner).await?;
        Ok(compute_claim_summary(&positions))
    }

    pub async fn pool_overview(&self, selector: PoolSelector) -> Result<PoolOverview, StakingError> {
        let params = self.registry.resolve(selector)?;
        let state = self.fetcher.pool_state(&params.pool_address).await?;
        let now = unix_now();

        let unit = 10u128.pow(u32::from(params.decimals));
        let share_price = round_display(
            to_decimal(
                shares_to_token(unit, state.total_staked, state.share_supply),
                u32::from(params.decimals),
            ),
            DISPLAY_PRECISION,
        );
        let elapsed = now.saturating_sub(state.start_time);

        Ok(PoolOverview {
            selector,
            state,
            lock_seconds: params.lock_seconds,
            claim_delay_seconds: params.claim_delay_seconds,
            share_price,
            reward_rate_percent: rate_to_percentage(state.reward_rate, RATE_SCALE_DECIMALS),
            staker_apr_percent: annualized_percentage(
                state.current_reward,
                state.total_staked,
                elapsed,
            ),
        })
    }

    /// Plan a stake of a display amount, checking the owner's token
    /// balance against the snapshot.
    pub async fn plan_stake(
        &self,
        selector: PoolSelector,
        owner: &Pubkey,
        display_amount: f64,
    ) -> Result<StakePlan, StakingError> {
        let params = self.registry.resolve(selector)?;
        let amount = to_raw(display_amount, u32::from(params.decimals))?;
        if amount == 0 {
            return Err(StakingError::AmountNotSpecified);
        }

        let balance = self.fetcher.token_balance(&params.token_mint, owner).await?;
        if amount > balance {
            return Err(StakingError::InsufficientBalance {
                requested: amount,
                available: balance,
            });
        }

        let next_stake_nonce = self.fetcher.stake_count(&params.pool_address, owner).await?;
        Ok(StakePlan {
            selector,
            amount,
            next_stake_nonce,
        })
    }

    /// Plan a batched unstake: aggregate the stake ledger, select the
    /// minimal covering nonce range, then re-check the share balance
    /// just-in-time so a stale snapshot cannot produce an oversized
    /// settlement request.
    pub async fn plan_unstake(
        &self,
        selector: PoolSelector,
        owner: &Pubkey,
        target: UnstakeTarget,
    ) -> Result<UnstakePlan, StakingError> {
        let params = self.registry.resolve(selector)?;
        let positions =
            fetch_stake_positions(self.fetcher.as_ref(), &params.pool_address, owner).await?;
        let now = unix_now();
        let summary = compute_staking_summary(&positions, now, params);

        let selection = select_range(
            &summary.records,
            target,
            MAX_BATCH_WIDTH,
            self.overflow_policy,
        )?;
        debug!(
            "selected nonces {}..={} covering {}",
            selection.range.start, selection.range.end, selection.amount
        );

        self.recheck_balance(&params.share_mint, owner, &selection)
            .await?;

        let next_unstake_nonce = self
            .fetcher
            .unstake_count(&params.pool_address, owner)
            .await?;
        Ok(UnstakePlan {
            selector,
            amount: selection.amount,
            range: selection.range,
            truncated: selection.truncated,
            next_unstake_nonce,
        })
    }

    /// Plan a batched claim over the unstake ledger's eligible records.
    pub async fn plan_claim(
        &self,
        selector: PoolSelector,
        owner: &Pubkey,
        target: UnstakeTarget,
    ) -> Result<ClaimPlan, StakingError> {
        let params = self.registry.resolve(selector)?;
        let positions =
            fetch_unstake_positions(self.fetcher.as_ref(), &params.pool_address, owner).await?;
        let now = unix_now();
        let summary = compute_unstaking_summary(&positions, now, params);

        let selection = select_range(
            &summary.records,
            target,
            MAX_BATCH_WIDTH,
            self.overflow_policy,
        )?;
        if selection.truncated {
            info!(
                "claim clamped to nonces {}..={}, covering {} of the eligible total",
                selection.range.start, selection.range.end, selection.amount
            );
        }

        Ok(ClaimPlan {
            selector,
            amount: selection.amount,
            range: selection.range,
            truncated: selection.truncated,
        })
    }

    /// Approve-if-needed plus stake, as one unsigned transaction.
    pub async fn build_stake_transaction(
        &self,
        owner: &Pubkey,
        plan: &StakePlan,
    ) -> Result<Transaction, StakingError> {
        let params = self.registry.resolve(plan.selector)?;
        let allowance = self
            .fetcher
            .token_allowance(
                &params.token_mint,
                owner,
                &self.vault_address(params),
            )
            .await?;

        let mut instructions = Vec::with_capacity(2);
        if let Some(approve) =
            build_approve_instruction(&self.program_id, params, owner, plan.amount, allowance)?
        {
            instructions.push(approve);
        }
        instructions.push(build_stake_instruction(
            &self.program_id,
            params,
            owner,
            plan.amount,
            plan.next_stake_nonce,
        )?);
        Ok(build_transaction(&instructions, owner))
    }

    pub fn build_unstake_transaction(
        &self,
        owner: &Pubkey,
        plan: &UnstakePlan,
    ) -> Result<Transaction, StakingError> {
        let params = self.registry.resolve(plan.selector)?;
        let instruction = build_unstake_instruction(
            &self.program_id,
            params,
            owner,
            plan.amount,
            &plan.range,
            plan.next_unstake_nonce,
        )?;
        Ok(build_transaction(&[instruction], owner))
    }

    pub fn build_claim_transaction(
        &self,
        owner: &Pubkey,
        plan: &ClaimPlan,
    ) -> Result<Transaction, StakingError> {
        let params = self.registry.resolve(plan.selector)?;
        let instruction =
            build_claim_instruction(&self.program_id, params, owner, &plan.range)?;
        Ok(build_transaction(&[instruction], owner))
    }

    /// Display helper for raw amounts of one pool's token.
    pub fn display_amount(
        &self,
        selector: PoolSelector,
        raw: RawAmount,
    ) -> Result<f64, StakingError> {
        let params = self.registry.resolve(selector)?;
        Ok(round_display(
            to_decimal(raw, u32::from(params.decimals)),
            DISPLAY_PRECISION,
        ))
    }

    fn vault_address(&self, params: &PoolParameters) -> Pubkey {
        crate::infrastructure::ledger::accounts::pool_vault_address(
            &self.program_id,
            &params.pool_address,
        )
    }

    async fn recheck_balance(
        &self,
        share_mint: &Pubkey,
        owner: &Pubkey,
        selection: &RangeSelection,
    ) -> Result<(), StakingError> {
        let balance = self.fetcher.token_balance(share_mint, owner).await?;
        if selection.amount > balance {
            return Err(StakingError::InsufficientBalance {
                requested: selection.amount,
                available: balance,
            });
        }
        Ok(())
    }
}

fn unix_now() -> UnixSeconds {
    let now = chrono::Utc::now().timestamp();
    now.max(0) as UnixSeconds
}
