//! Point-in-time summaries over fetched ledger records

pub mod aggregator;

pub use aggregator::{compute_claim_summary, compute_staking_summary, compute_unstaking_summary};
