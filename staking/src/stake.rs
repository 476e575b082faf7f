//! Per-account stake record.

use levy_types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// A stake record. An amount of zero is equivalent to no stake at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub amount: Amount,
    /// Start of the current accrual window; reset on every settlement.
    pub timestamp: Timestamp,
    /// Whole-percent rate captured when the stake was last topped up.
    pub reward_rate: u64,
}

impl StakeRecord {
    pub fn is_active(&self) -> bool {
        !self.amount.is_zero()
    }
}
