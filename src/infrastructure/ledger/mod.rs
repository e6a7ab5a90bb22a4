//! On-chain ledger access

pub mod accounts;
pub mod fetcher;

pub use fetcher::{
    fetch_stake_positions, fetch_unstake_positions, LedgerFetcher, SolanaLedgerFetcher,
};
