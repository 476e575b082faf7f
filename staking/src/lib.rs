//! Staking: lock balances and accrue time-proportional rewards.
//!
//! `reward(w) = floor(amount × rate × elapsed / (interval × 100))`
//!
//! This crate handles:
//! - Per-account stake records and the aggregate staked total
//! - The pure reward formula
//! - Settlement bookkeeping (the reward mint itself is done by the caller
//!   against the ledger)

pub mod engine;
pub mod error;
pub mod reward;
pub mod stake;

pub use engine::StakingEngine;
pub use error::StakingError;
pub use reward::RewardSchedule;
pub use stake::StakeRecord;
