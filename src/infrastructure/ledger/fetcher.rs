//! Ledger access: record counters, records and balances by account
//!
//! Per-index record fetches are independent and fan out concurrently, but
//! results are reassembled in strict index order before aggregation; range
//! selection depends on an index-ascending scan.

use crate::infrastructure::ledger::accounts::{
    ledger_counter_address, pool_vault_address, stake_record_address, unstake_record_address,
    LedgerCounterAccount, PoolStateAccount, StakeRecordAccount, UnstakeRecordAccount,
};
use crate::shared::errors::ProviderError;
use crate::shared::types::{PoolState, RawAmount, StakePosition, UnstakePosition};
use async_trait::async_trait;
use borsh::BorshDeserialize;
use futures::future::try_join_all;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::program_option::COption;
use spl_associated_token_account::get_associated_token_address;
use tracing::debug;

/// Read access to an account's ledgers in one pool.
///
/// Records are immutable per (account, pool, index, chain-state): the same
/// index returns the same value until the ledger itself advances.
#[async_trait]
pub trait LedgerFetcher: Send + Sync {
    async fn stake_count(&self, pool: &Pubkey, owner: &Pubkey) -> Result<u64, ProviderError>;

    async fn stake_record(
        &self,
        pool: &Pubkey,
        owner: &Pubkey,
        index: u64,
    ) -> Result<StakePosition, ProviderError>;

    async fn unstake_count(&self, pool: &Pubkey, owner: &Pubkey) -> Result<u64, ProviderError>;

    async fn unstake_record(
        &self,
        pool: &Pubkey,
        owner: &Pubkey,
        index: u64,
    ) -> Result<UnstakePosition, ProviderError>;

    async fn pool_state(&self, pool: &Pubkey) -> Result<PoolState, ProviderError>;

    /// Balance of the owner's associated token account for `mint`; zero if
    /// the account does not exist yet.
    async fn token_balance(&self, mint: &Pubkey, owner: &Pubkey) -> Result<RawAmount, ProviderError>;

    /// Amount the owner has delegated to `delegate` on their `mint`
    /// account; zero without a matching delegation.
    async fn token_allowance(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        delegate: &Pubkey,
    ) -> Result<RawAmount, ProviderError>;
}

/// Fetch every stake record of one account, index-ascending.
pub async fn fetch_stake_positions(
    fetcher: &dyn LedgerFetcher,
    pool: &Pubkey,
    owner: &Pubkey,
) -> Result<Vec<StakePosition>, ProviderError> {
    let count = fetcher.stake_count(pool, owner).await?;
    debug!("fetching {count} stake records");
    let mut positions =
        try_join_all((0..count).map(|index| fetcher.stake_record(pool, owner, index))).await?;
    positions.sort_by_key(|p| p.index);
    Ok(positions)
}

/// Fetch every unstake record of one account, index-ascending.
pub async fn fetch_unstake_positions(
    fetcher: &dyn LedgerFetcher,
    pool: &Pubkey,
    owner: &Pubkey,
) -> Result<Vec<UnstakePosition>, ProviderError> {
    let count = fetcher.unstake_count(pool, owner).await?;
    debug!("fetching {count} unstake records");
    let mut positions =
        try_join_all((0..count).map(|index| fetcher.unstake_record(pool, owner, index))).await?;
    positions.sort_by_key(|p| p.index);
    Ok(positions)
}

/// Ledger fetcher backed by a Solana RPC node
pub struct SolanaLedgerFetcher {
    client: RpcClient,
    program_id: Pubkey,
}

impl SolanaLedgerFetcher {
    pub fn new(rpc_url: String, program_id: Pubkey) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()),
            program_id,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn vault_address(&self, pool: &Pubkey) -> Pubkey {
        pool_vault_address(&self.program_id, pool)
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ProviderError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| ProviderError::Rpc(format!("failed to get account {address}: {e}")))?;
        Ok(response.value.map(|account| account.data))
    }

    async fn required_account_data(&self, address: &Pubkey) -> Result<Vec<u8>, ProviderError> {
        self.account_data(address)
            .await?
            .ok_or_else(|| ProviderError::AccountNotFound(address.to_string()))
    }

    async fn counters(
        &self,
        pool: &Pubkey,
        owner: &Pubkey,
    ) -> Result<LedgerCounterAccount, ProviderError> {
        let address = ledger_counter_address(&self.program_id, pool, owner);
        match self.account_data(&address).await? {
            // no counter account yet means an empty ledger
            None => Ok(LedgerCounterAccount::default()),
            Some(data) => LedgerCounterAccount::try_from_slice(&data)
                .map_err(|e| ProviderError::MalformedAccount(format!("{address}: {e}"))),
        }
    }
}

#[async_trait]
impl LedgerFetcher for SolanaLedgerFetcher {
    async fn stake_count(&self, pool: &Pubkey, owner: &Pubkey) -> Result<u64, ProviderError> {
        Ok(self.counters(pool, owner).await?.stake_count)
    }

    async fn stake_record(
        &self,
        pool: &Pubkey,
        owner: &Pubkey,
        index: u64,
    ) -> Result<StakePosition, ProviderError> {
        let address = stake_record_address(&self.program_id, pool, owner, index);
        let data = self.required_account_data(&address).await?;
        let record = StakeRecordAccount::try_from_slice(&data)
            .map_err(|e| ProviderError::MalformedAccount(format!("{address}: {e}")))?;
        Ok(record.into_position(index))
    }

    async fn unstake_count(&self, pool: &Pubkey, owner: &Pubkey) -> Result<u64, ProviderError> {
        Ok(self.counters(pool, owner).await?.unstake_count)
    }

    async fn unstake_record(
        &self,
        pool: &Pubkey,
        owner: &Pubkey,
        index: u64,
    ) -> Result<UnstakePosition, ProviderError> {
        let address = unstake_record_address(&self.program_id, pool, owner, index);
        let data = self.required_account_data(&address).await?;
        let record = UnstakeRecordAccount::try_from_slice(&data)
            .map_err(|e| ProviderError::MalformedAccount(format!("{address}: {e}")))?;
        Ok(record.into_position(index))
    }

    async fn pool_state(&self, pool: &Pubkey) -> Result<PoolState, ProviderError> {
        let data = self.required_account_data(pool).await?;
        let state = PoolStateAccount::try_from_slice(&data)
            .map_err(|e| ProviderError::MalformedAccount(format!("{pool}: {e}")))?;
        Ok(state.into_state())
    }

    async fn token_balance(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
    ) -> Result<RawAmount, ProviderError> {
        let address = get_associated_token_address(owner, mint);
        match self.account_data(&address).await? {
            None => Ok(0),
            Some(data) => {
                let account = spl_token::state::Account::unpack(&data)
                    .map_err(|e| ProviderError::MalformedAccount(format!("{address}: {e}")))?;
                Ok(u128::from(account.amount))
            }
        }
    }

    async fn token_allowance(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        delegate: &Pubkey,
    ) -> Result<RawAmount, ProviderError> {
        let address = get_associated_token_address(owner, mint);
        match self.account_data(&address).await? {
            None => Ok(0),
            Some(data) => {
                let account = spl_token::state::Account::unpack(&data)
                    .map_err(|e| ProviderError::MalformedAccount(format!("{address}: {e}")))?;
                match account.delegate {
                    COption::Some(current) if current == *delegate => {
                        Ok(u128::from(account.delegated_amount))
                    }
                    _ => Ok(0),
                }
            }
        }
    }
}
