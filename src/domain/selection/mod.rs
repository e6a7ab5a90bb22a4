//! Settlement range selection

pub mod range_selector;

pub use range_selector::{
    select_range, BatchOverflowPolicy, EligibleEntry, RangeSelection, UnstakeTarget,
    MAX_BATCH_WIDTH,
};
