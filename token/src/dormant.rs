//! State declared by the token but never driven by any operation.
//!
//! Vesting schedules and the community reward pool are part of the persisted
//! data model and can be queried, but there is no release or claim operation:
//! the vesting map stays empty and the pool's `claimed` counter stays zero.
//! The matching `VestingReleased` and `CommunityRewardClaimed` events are
//! likewise never emitted.

use levy_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// A linear vesting schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingSchedule {
    pub beneficiary: Address,
    pub total: Amount,
    pub released: Amount,
    pub start: Timestamp,
    pub duration_secs: u64,
}

/// The community reward allocation minted at construction.
///
/// The allocation sits in the system account next to staked principal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityRewardPool {
    pub allocated: Amount,
    pub claimed: Amount,
}
