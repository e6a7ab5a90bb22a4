//! Pool registry: (token, lock-period) selectors resolved to pool parameters

use crate::domain::amount::MAX_DECIMALS;
use crate::shared::errors::StakingError;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

/// Stakeable token kinds supported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// The platform token itself
    Base,
    /// The escrowed voucher token
    Voucher,
}

/// Supported lock periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockPeriod {
    #[serde(rename = "365d")]
    Days365,
    #[serde(rename = "180d")]
    Days180,
    #[serde(rename = "90d")]
    Days90,
    #[serde(rename = "flex")]
    Flex,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Base => "base",
            TokenKind::Voucher => "voucher",
        }
    }
}

impl LockPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockPeriod::Days365 => "365d",
            LockPeriod::Days180 => "180d",
            LockPeriod::Days90 => "90d",
            LockPeriod::Flex => "flex",
        }
    }
}

impl std::str::FromStr for TokenKind {
    type Err = StakingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(TokenKind::Base),
            "voucher" => Ok(TokenKind::Voucher),
            _ => Err(StakingError::Config(format!("unknown token kind '{s}'"))),
        }
    }
}

impl std::str::FromStr for LockPeriod {
    type Err = StakingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "365d" => Ok(LockPeriod::Days365),
            "180d" => Ok(LockPeriod::Days180),
            "90d" => Ok(LockPeriod::Days90),
            "flex" => Ok(LockPeriod::Flex),
            _ => Err(StakingError::Config(format!("unknown lock period '{s}'"))),
        }
    }
}

/// One staking market: a (token, lock-period) pair. Replaces key-by-string
/// config lookups with an enumerated selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolSelector {
    pub token: TokenKind,
    pub period: LockPeriod,
}

impl PoolSelector {
    pub fn new(token: TokenKind, period: LockPeriod) -> Self {
        Self { token, period }
    }
}

/// Immutable parameters of one pool, resolved once per selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParameters {
    pub selector: PoolSelector,
    /// Pool state account on the staking program
    pub pool_address: Pubkey,
    /// Mint of the pool-share token
    pub share_mint: Pubkey,
    /// Mint of the staked token
    pub token_mint: Pubkey,
    pub decimals: u8,
    pub lock_seconds: u64,
    pub claim_delay_seconds: u64,
}

/// Registry of all configured pools. Built once from validated
/// configuration; read-only afterwards.
#[derive(Debug, Clone)]
pub struct PoolRegistry {
    pools: HashMap<PoolSelector, PoolParameters>,
}

impl PoolRegistry {
    /// Build the lookup table, validating every definition.
    pub fn new(definitions: Vec<PoolParameters>) -> Result<Self, StakingError> {
        let mut pools = HashMap::with_capacity(definitions.len());
        for params in definitions {
            validate(&params)?;
            if pools.insert(params.selector, params.clone()).is_some() {
                return Err(StakingError::Config(format!(
                    "duplicate pool definition for {} {}",
                    params.selector.token.as_str(),
                    params.selector.period.as_str()
                )));
            }
        }
        Ok(Self { pools })
    }

    pub fn resolve(&self, selector: PoolSelector) -> Result<&PoolParameters, StakingError> {
        self.pools
            .get(&selector)
            .ok_or_else(|| StakingError::UnknownPool {
                token: selector.token.as_str().to_string(),
                period: selector.period.as_str().to_string(),
            })
    }

    pub fn selectors(&self) -> impl Iterator<Item = &PoolSelector> {
        self.pools.keys()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

fn validate(params: &PoolParameters) -> Result<(), StakingError> {
    if u32::from(params.decimals) > MAX_DECIMALS {
        return Err(StakingError::Config(format!(
            "pool {} {}: decimals {} out of range 0..={MAX_DECIMALS}",
            params.selector.token.as_str(),
            params.selector.period.as_str(),
            params.decimals
        )));
    }
    if params.selector.period == LockPeriod::Flex && params.lock_seconds != 0 {
        return Err(StakingError::Config(format!(
            "pool {} flex: lock_seconds must be 0, got {}",
            params.selector.token.as_str(),
            params.lock_seconds
        )));
    }
    Ok(())
}
