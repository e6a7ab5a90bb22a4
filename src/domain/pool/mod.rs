//! Pool selectors, parameters and exchange-ratio math

pub mod registry;
pub mod share_price;

pub use registry::{LockPeriod, PoolParameters, PoolRegistry, PoolSelector, TokenKind};
pub use share_price::{shares_to_token, token_to_shares};
