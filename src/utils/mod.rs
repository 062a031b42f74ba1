//! Support structures shared across the crate.

mod bitset;

pub use bitset::BitSet;
