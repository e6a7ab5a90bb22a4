//! Error handling for the application

use thiserror::Error;

/// Upstream ledger/provider errors. Opaque to the core: callers surface
/// them, nothing in this crate interprets or retries them.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("rpc request failed: {0}")]
    Rpc(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("account data malformed: {0}")]
    MalformedAccount(String),

    #[error("backend request failed: {0}")]
    Backend(String),
}

/// Staking client errors
#[derive(Error, Debug, Clone)]
pub enum StakingError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unstake amount not specified")]
    AmountNotSpecified,

    #[error("insufficient eligible balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("selected range spans {width} records, batch limit is {limit}")]
    BatchTooLarge { width: u64, limit: u64 },

    #[error("no staking pool configured for {token} {period}")]
    UnknownPool { token: String, period: String },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("configuration error: {0}")]
    Config(String),
}
