//! Stakepools - Solana Staking Pools Client
//! Built with Domain-Driven Design principles

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{StakingService, UnstakePlan};
pub use domain::amount::{round_display, to_decimal, to_raw};
pub use domain::pool::{LockPeriod, PoolRegistry, PoolSelector, TokenKind};
pub use domain::rewards::rate_to_percentage;
pub use domain::selection::{select_range, BatchOverflowPolicy, UnstakeTarget, MAX_BATCH_WIDTH};
pub use domain::summary::{
    compute_claim_summary, compute_staking_summary, compute_unstaking_summary,
};
pub use infrastructure::ledger::{LedgerFetcher, SolanaLedgerFetcher};
