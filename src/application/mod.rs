//! Application services and settlement construction

pub mod services;
pub mod transactions;

pub use services::{ClaimPlan, PoolOverview, StakePlan, StakingService, UnstakePlan};
