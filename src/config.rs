use crate::domain::pool::{LockPeriod, PoolParameters, PoolRegistry, PoolSelector, TokenKind};
use crate::shared::errors::StakingError;
use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::{fs, path::Path};

const DAY: u64 = 24 * 60 * 60;

/// Target cluster. Devnet pools run shortened lock and claim windows so
/// the full stake/unstake/claim cycle can be exercised in days, not years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Devnet,
}

impl Cluster {
    pub fn lock_seconds(self, period: LockPeriod) -> u64 {
        match self {
            Cluster::MainnetBeta => match period {
                LockPeriod::Days365 => 365 * DAY,
                LockPeriod::Days180 => 180 * DAY,
                LockPeriod::Days90 => 90 * DAY,
                LockPeriod::Flex => 0,
            },
            Cluster::Devnet => match period {
                LockPeriod::Days365 => 3 * DAY,
                LockPeriod::Days180 => 2 * DAY,
                LockPeriod::Days90 => DAY,
                LockPeriod::Flex => 0,
            },
        }
    }

    pub fn claim_delay_seconds(self) -> u64 {
        match self {
            Cluster::MainnetBeta => DAY,
            Cluster::Devnet => 10 * 60,
        }
    }

    /// Length of the whole reward program
    pub fn total_duration_seconds(self) -> u64 {
        match self {
            Cluster::MainnetBeta => 3 * 365 * DAY,
            Cluster::Devnet => 14 * DAY,
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StakingCfg {
    pub cluster: Cluster,
    /// Staking program id
    pub program: String,
    /// Stats backend base URL, optional
    pub backend_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub mint: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokensCfg {
    pub base: TokenInfo,
    pub voucher: TokenInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolCfg {
    pub token: TokenKind,
    pub period: LockPeriod,
    /// Pool state account
    pub address: String,
    pub share_mint: String,
    /// Override the cluster preset, mostly for test deployments
    pub lock_seconds: Option<u64>,
    pub claim_delay_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcCfg,
    pub staking: StakingCfg,
    pub tokens: TokensCfg,
    pub pools: Vec<PoolCfg>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self = toml::from_str(&s).context("parse Config.toml")?;
        Ok(cfg)
    }

    pub fn program_id(&self) -> Result<Pubkey, StakingError> {
        parse_pubkey(&self.staking.program, "staking program id")
    }

    /// Build the pool registry from the configured pools, filling lock and
    /// claim windows from the cluster preset where not overridden.
    pub fn build_registry(&self) -> Result<PoolRegistry, StakingError> {
        let cluster = self.staking.cluster;
        let mut definitions = Vec::with_capacity(self.pools.len());
        for pool in &self.pools {
            let token_info = match pool.token {
                TokenKind::Base => &self.tokens.base,
                TokenKind::Voucher => &self.tokens.voucher,
            };
            definitions.push(PoolParameters {
                selector: PoolSelector::new(pool.token, pool.period),
                pool_address: parse_pubkey(&pool.address, "pool address")?,
                share_mint: parse_pubkey(&pool.share_mint, "share mint")?,
                token_mint: parse_pubkey(&token_info.mint, "token mint")?,
                decimals: token_info.decimals,
                lock_seconds: pool
                    .lock_seconds
                    .unwrap_or_else(|| cluster.lock_seconds(pool.period)),
                claim_delay_seconds: pool
                    .claim_delay_seconds
                    .unwrap_or_else(|| cluster.claim_delay_seconds()),
            });
        }
        PoolRegistry::new(definitions)
    }
}

fn parse_pubkey(value: &str, what: &str) -> Result<Pubkey, StakingError> {
    Pubkey::from_str(value)
        .map_err(|e| StakingError::Config(format!("invalid {what} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> String {
        let pool = Pubkey::new_unique();
        let share_mint = Pubkey::new_unique();
        let base_mint = Pubkey::new_unique();
        let voucher_mint = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        format!(
            r#"
[rpc]
url = "https://api.devnet.solana.com"

[staking]
cluster = "devnet"
program = "{program}"

[tokens.base]
mint = "{base_mint}"
symbol = "STK"
decimals = 9

[tokens.voucher]
mint = "{voucher_mint}"
symbol = "vSTK"
decimals = 9

[[pools]]
token = "base"
period = "90d"
address = "{pool}"
share_mint = "{share_mint}"
"#
        )
    }

    #[test]
    fn test_parse_and_build_registry() {
        let cfg: Config = toml::from_str(&sample_toml()).unwrap();
        assert_eq!(cfg.staking.cluster, Cluster::Devnet);

        let registry = cfg.build_registry().unwrap();
        let params = registry
            .resolve(PoolSelector::new(TokenKind::Base, LockPeriod::Days90))
            .unwrap();
        // devnet preset: 90d pool locks for one day, claims after ten minutes
        assert_eq!(params.lock_seconds, DAY);
        assert_eq!(params.claim_delay_seconds, 600);
        assert_eq!(params.decimals, 9);
    }

    #[test]
    fn test_pool_overrides_beat_cluster_preset() {
        let mut cfg: Config = toml::from_str(&sample_toml()).unwrap();
        cfg.pools[0].lock_seconds = Some(42);
        cfg.pools[0].claim_delay_seconds = Some(7);

        let registry = cfg.build_registry().unwrap();
        let params = registry
            .resolve(PoolSelector::new(TokenKind::Base, LockPeriod::Days90))
            .unwrap();
        assert_eq!(params.lock_seconds, 42);
        assert_eq!(params.claim_delay_seconds, 7);
    }

    #[test]
    fn test_invalid_pubkey_is_a_config_error() {
        let mut cfg: Config = toml::from_str(&sample_toml()).unwrap();
        cfg.pools[0].address = "not-a-pubkey".to_string();
        assert!(matches!(
            cfg.build_registry(),
            Err(StakingError::Config(_))
        ));
    }

    #[test]
    fn test_mainnet_lock_windows() {
        let cluster = Cluster::MainnetBeta;
        assert_eq!(cluster.lock_seconds(LockPeriod::Days365), 365 * DAY);
        assert_eq!(cluster.lock_seconds(LockPeriod::Days180), 180 * DAY);
        assert_eq!(cluster.lock_seconds(LockPeriod::Days90), 90 * DAY);
        assert_eq!(cluster.lock_seconds(LockPeriod::Flex), 0);
        assert_eq!(cluster.claim_delay_seconds(), DAY);
    }
}
