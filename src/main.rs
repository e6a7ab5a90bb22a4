use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

use stakepools::application::StakingService;
use stakepools::config::Config;
use stakepools::domain::amount::to_raw;
use stakepools::domain::pool::PoolSelector;
use stakepools::domain::selection::{BatchOverflowPolicy, UnstakeTarget};
use stakepools::infrastructure::backend::BackendClient;
use stakepools::infrastructure::ledger::SolanaLedgerFetcher;
use stakepools::shared::types::{StakingSummary, UnixSeconds, UnstakingSummary};

#[derive(Parser, Debug)]
#[command(version, about = "Staking pools client for Solana - summaries and batched settlement planning")]
struct Args {
    /// Path to config file
    #[arg(long, default_value = "Config.toml")]
    config: String,

    /// RPC endpoint URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show staking, unstaking and claim summaries for an account
    Summary {
        /// Account address
        account: String,
        /// Token kind (base, voucher)
        token: String,
        /// Lock period (365d, 180d, 90d, flex)
        period: String,
    },

    /// Show live pool state, share price and rates
    PoolInfo {
        token: String,
        period: String,
    },

    /// Plan a batched unstake: the minimal contiguous nonce range covering
    /// the requested amount
    PlanUnstake {
        account: String,
        token: String,
        period: String,

        /// Amount to unstake, in display units
        #[arg(long)]
        amount: Option<f64>,

        /// Unstake everything currently eligible
        #[arg(long)]
        max: bool,

        /// Clamp an oversized range to the batch limit instead of failing
        #[arg(long)]
        truncate: bool,
    },

    /// Plan a batched claim of everything claimable
    PlanClaim {
        account: String,
        token: String,
        period: String,

        /// Clamp an oversized range to the batch limit instead of failing
        #[arg(long)]
        truncate: bool,
    },

    /// Query the stats backend
    Stats {
        /// Token kind, for per-pool stats
        #[arg(long)]
        token: Option<String>,

        /// Lock period, for per-pool stats
        #[arg(long)]
        period: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut cfg = Config::from_file(&args.config)
        .with_context(|| format!("load config from {}", args.config))?;
    if let Some(rpc_url) = args.rpc_url {
        cfg.rpc.url = rpc_url;
    }

    match args.command {
        Command::Summary {
            account,
            token,
            period,
        } => {
            let service = build_service(&cfg, false)?;
            let selector = parse_selector(&token, &period)?;
            let owner = parse_account(&account)?;

            let staking = service.staking_summary(selector, &owner).await?;
            let unstaking = service.unstaking_summary(selector, &owner).await?;
            let claims = service.claim_summary(selector, &owner).await?;

            if args.json {
                let value = serde_json::json!({
                    "staking": staking,
                    "unstaking": unstaking,
                    "claims": claims,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_staking_summary(&service, selector, &staking)?;
                print_unstaking_summary(&service, selector, &unstaking)?;
                println!("Claimed so far: {}", service.display_amount(selector, claims.total_claimed)?);
            }
        }

        Command::PoolInfo { token, period } => {
            let service = build_service(&cfg, false)?;
            let selector = parse_selector(&token, &period)?;
            let overview = service.pool_overview(selector).await?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                println!(
                    "Pool {} {}",
                    selector.token.as_str(),
                    selector.period.as_str()
                );
                println!("  total staked:   {}", service.display_amount(selector, overview.state.total_staked)?);
                println!("  total unstaked: {}", service.display_amount(selector, overview.state.total_unstaked)?);
                println!("  share price:    {}", overview.share_price);
                println!("  reward rate:    {}%", overview.reward_rate_percent);
                println!("  staker APR:     {}%", overview.staker_apr_percent);
                println!("  lock:           {}s", overview.lock_seconds);
                println!("  claim delay:    {}s", overview.claim_delay_seconds);
                println!(
                    "  program length: {}s",
                    cfg.staking.cluster.total_duration_seconds()
                );
                if overview.state.staking_paused {
                    println!("  staking is PAUSED");
                }
                if overview.state.claim_paused {
                    println!("  claims are PAUSED");
                }
            }
        }

        Command::PlanUnstake {
            account,
            token,
            period,
            amount,
            max,
            truncate,
        } => {
            let service = build_service(&cfg, truncate)?;
            let selector = parse_selector(&token, &period)?;
            let owner = parse_account(&account)?;
            let target = parse_target(&service, selector, amount, max)?;

            let plan = service.plan_unstake(selector, &owner, target).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!(
                    "Unstake {} via nonces {}..={} ({} records)",
                    service.display_amount(selector, plan.amount)?,
                    plan.range.start,
                    plan.range.end,
                    plan.range.width()
                );
                if plan.truncated {
                    println!("  range clamped to the batch limit; the plan covers less than requested");
                }
            }
        }

        Command::PlanClaim {
            account,
            token,
            period,
            truncate,
        } => {
            let service = build_service(&cfg, truncate)?;
            let selector = parse_selector(&token, &period)?;
            let owner = parse_account(&account)?;

            let plan = service
                .plan_claim(selector, &owner, UnstakeTarget::Max)
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!(
                    "Claim {} via nonces {}..={} ({} records)",
                    service.display_amount(selector, plan.amount)?,
                    plan.range.start,
                    plan.range.end,
                    plan.range.width()
                );
                if plan.truncated {
                    println!("  range clamped to the batch limit; the plan covers less than claimable");
                }
            }
        }

        Command::Stats { token, period } => {
            let base_url = cfg
                .staking
                .backend_url
                .clone()
                .ok_or_else(|| anyhow!("no backend_url configured"))?;
            let backend = BackendClient::new(base_url)?;

            match (token, period) {
                (Some(token), Some(period)) => {
                    let selector = parse_selector(&token, &period)?;
                    let summary = backend
                        .pool_summary(selector.token, selector.period)
                        .await?;
                    println!(
                        "{} {}: staked {}, APR {}%",
                        summary.token, summary.period, summary.total_staked, summary.apr
                    );
                }
                (None, None) => {
                    let summary = backend.platform_summary().await?;
                    println!(
                        "Platform: staked {}, rewards {}, {} stakers",
                        summary.total_staked, summary.total_rewards, summary.staker_count
                    );
                }
                _ => return Err(anyhow!("--token and --period go together")),
            }
        }
    }

    Ok(())
}

fn build_service(cfg: &Config, truncate: bool) -> Result<StakingService> {
    let registry = cfg.build_registry()?;
    let program_id = cfg.program_id()?;
    let fetcher = Arc::new(SolanaLedgerFetcher::new(cfg.rpc.url.clone(), program_id));
    let mut service = StakingService::new(registry, fetcher, program_id);
    if truncate {
        service = service.with_overflow_policy(BatchOverflowPolicy::Truncate);
    }
    Ok(service)
}

fn parse_selector(token: &str, period: &str) -> Result<PoolSelector> {
    Ok(PoolSelector::new(token.parse()?, period.parse()?))
}

fn parse_account(account: &str) -> Result<Pubkey> {
    Pubkey::from_str(account).map_err(|e| anyhow!("invalid account address '{account}': {e}"))
}

fn parse_target(
    service: &StakingService,
    selector: PoolSelector,
    amount: Option<f64>,
    max: bool,
) -> Result<UnstakeTarget> {
    if max {
        return Ok(UnstakeTarget::Max);
    }
    let amount = amount.ok_or_else(|| anyhow!("--amount or --max is required"))?;
    let decimals = u32::from(service.registry().resolve(selector)?.decimals);
    Ok(UnstakeTarget::Amount(to_raw(amount, decimals)?))
}

fn print_staking_summary(
    service: &StakingService,
    selector: PoolSelector,
    summary: &StakingSummary,
) -> Result<()> {
    println!("Staking records:");
    for record in &summary.records {
        println!(
            "  #{:<4} {:>16} {} {}",
            record.index,
            service.display_amount(selector, record.pool_share_remaining)?,
            if record.is_eligible { "eligible" } else { "locked  " },
            format_time(record.eligible_at)
        );
    }
    println!("  total staked:    {}", service.display_amount(selector, summary.total_token_amount)?);
    println!("  total remaining: {}", service.display_amount(selector, summary.total_remaining)?);
    println!("  eligible now:    {}", service.display_amount(selector, summary.total_eligible)?);
    println!("  still locked:    {}", service.display_amount(selector, summary.total_locked)?);
    Ok(())
}

fn print_unstaking_summary(
    service: &StakingService,
    selector: PoolSelector,
    summary: &UnstakingSummary,
) -> Result<()> {
    println!("Unstaking records:");
    for record in &summary.records {
        println!(
            "  #{:<4} {:>16} {} {}",
            record.index,
            service.display_amount(selector, record.token_remaining)?,
            if record.is_eligible { "claimable" } else { "pending  " },
            format_time(record.eligible_at)
        );
    }
    println!("  claimable now:   {}", service.display_amount(selector, summary.total_eligible)?);
    println!("  still pending:   {}", service.display_amount(selector, summary.total_locked)?);
    Ok(())
}

fn format_time(at: UnixSeconds) -> String {
    i64::try_from(at)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}
