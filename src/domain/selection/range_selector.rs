//! Minimal contiguous nonce-range selection for batched settlement
//!
//! Given an account's annotated ledger records and a target amount, pick
//! the smallest eligible, contiguous index span whose eligible sum covers
//! the target. One settlement transaction references every ledger index in
//! the returned range, so the span is bounded by `MAX_BATCH_WIDTH`.

use crate::shared::errors::StakingError;
use crate::shared::types::{NonceRange, RawAmount, StakingRecord, UnstakingRecord};

/// Most ledger indices one settlement transaction may reference
pub const MAX_BATCH_WIDTH: u64 = 20;

/// What the caller wants settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnstakeTarget {
    /// A specific raw amount
    Amount(RawAmount),
    /// Everything currently eligible
    Max,
}

/// What to do when the minimal covering span exceeds the batch width.
///
/// `Reject` is the default everywhere. `Truncate` clamps the span to the
/// width cap and reports the covered amount, so callers always see the
/// under-fulfilment; it is never applied silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchOverflowPolicy {
    #[default]
    Reject,
    Truncate,
}

/// A selected settlement range and the amount it settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSelection {
    pub range: NonceRange,
    /// Amount the settlement will reference: the requested target, the
    /// eligible total in `Max` mode, or the covered eligible sum when the
    /// range was truncated (always short of the request).
    pub amount: RawAmount,
    pub truncated: bool,
}

/// Record views the selector can scan. Summaries annotate each record with
/// its eligible amount; the selector needs nothing else.
pub trait EligibleEntry {
    fn index(&self) -> u64;
    fn eligible_amount(&self) -> RawAmount;
}

impl EligibleEntry for StakingRecord {
    fn index(&self) -> u64 {
        self.index
    }

    fn eligible_amount(&self) -> RawAmount {
        self.eligible_amount
    }
}

impl EligibleEntry for UnstakingRecord {
    fn index(&self) -> u64 {
        self.index
    }

    fn eligible_amount(&self) -> RawAmount {
        self.eligible_amount
    }
}

/// Select the minimal eligible contiguous index range covering `target`.
///
/// The scan is strictly index-ascending, so the oldest eligible records
/// unwind first. Ineligible records are skipped without resetting the
/// running sum; they may still sit inside the returned span and count
/// toward its width.
pub fn select_range<R: EligibleEntry>(
    records: &[R],
    target: UnstakeTarget,
    max_batch_width: u64,
    policy: BatchOverflowPolicy,
) -> Result<RangeSelection, StakingError> {
    if target == UnstakeTarget::Amount(0) {
        return Err(StakingError::AmountNotSpecified);
    }

    let total_eligible: RawAmount = records.iter().map(EligibleEntry::eligible_amount).sum();
    let mut candidates = records.iter().filter(|r| r.eligible_amount() > 0);

    let first = match candidates.next() {
        Some(record) => record,
        None => {
            return Err(StakingError::InsufficientBalance {
                requested: match target {
                    UnstakeTarget::Amount(amount) => amount,
                    UnstakeTarget::Max => 0,
                },
                available: 0,
            })
        }
    };

    match target {
        UnstakeTarget::Max => {
            let last = candidates.last().unwrap_or(first);
            let range = NonceRange {
                start: first.index(),
                end: last.index(),
            };
            apply_width_cap(records, range, total_eligible, max_batch_width, policy)
        }
        UnstakeTarget::Amount(amount) => {
            if amount > total_eligible {
                return Err(StakingError::InsufficientBalance {
                    requested: amount,
                    available: total_eligible,
                });
            }

            let start = first.index();
            let mut running = first.eligible_amount();
            let mut end = first.index();
            // stops at the first record where the running sum covers the
            // target, which is exactly the minimality requirement: the sum
            // short of `end` stays below the target
            while running < amount {
                let record = candidates
                    .next()
                    .expect("eligible total covers the target");
                running += record.eligible_amount();
                end = record.index();
            }

            let range = NonceRange { start, end };
            apply_width_cap(records, range, amount, max_batch_width, policy)
        }
    }
}

fn apply_width_cap<R: EligibleEntry>(
    records: &[R],
    range: NonceRange,
    amount: RawAmount,
    max_batch_width: u64,
    policy: BatchOverflowPolicy,
) -> Result<RangeSelection, StakingError> {
    if range.width() <= max_batch_width {
        return Ok(RangeSelection {
            range,
            amount,
            truncated: false,
        });
    }

    match policy {
        BatchOverflowPolicy::Reject => Err(StakingError::BatchTooLarge {
            width: range.width(),
            limit: max_batch_width,
        }),
        BatchOverflowPolicy::Truncate => {
            let clamped = NonceRange {
                start: range.start,
                end: range.start + max_batch_width - 1,
            };
            let covered = records
                .iter()
                .filter(|r| r.index() >= clamped.start && r.index() <= clamped.end)
                .map(EligibleEntry::eligible_amount)
                .sum();
            Ok(RangeSelection {
                range: clamped,
                amount: covered,
                truncated: true,
            })
        }
    }
}
