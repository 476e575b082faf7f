//! The reward formula.

use crate::stake::StakeRecord;
use levy_types::{Amount, LedgerParams, Timestamp};
use serde::{Deserialize, Serialize};

/// Reward rate and the period it is expressed over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSchedule {
    /// Whole percent per `interval_secs`.
    pub rate_percent: u64,
    pub interval_secs: u64,
}

impl RewardSchedule {
    pub fn from_params(params: &LedgerParams) -> Self {
        Self {
            rate_percent: params.reward_rate_percent,
            interval_secs: params.reward_interval_secs,
        }
    }

    /// Reward accrued by `record` between its timestamp and `now`.
    ///
    /// `floor(amount * reward_rate * elapsed / (interval * 100))`, using the
    /// rate stored on the record. Zero for an empty stake, zero when `now`
    /// precedes the record, `None` when the reward itself does not fit.
    pub fn accrued_checked(&self, record: &StakeRecord, now: Timestamp) -> Option<Amount> {
        if record.amount.is_zero() {
            return Some(Amount::ZERO);
        }
        let elapsed = record.timestamp.elapsed_since(now);
        let denominator = u128::from(self.interval_secs).checked_mul(100)?;
        if denominator == 0 {
            return Some(Amount::ZERO);
        }
        let weighted = record
            .amount
            .raw()
            .checked_mul(u128::from(record.reward_rate))?;
        let elapsed = u128::from(elapsed);

        // floor(weighted * elapsed / d) == (weighted / d) * elapsed
        //     + floor((weighted % d) * elapsed / d), without the full product.
        let whole = (weighted / denominator).checked_mul(elapsed)?;
        let part = (weighted % denominator).checked_mul(elapsed)? / denominator;
        Some(Amount::new(whole.checked_add(part)?))
    }
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self::from_params(&LedgerParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: u64 = 365 * 24 * 3600;

    fn record(tokens: u64, at: u64) -> StakeRecord {
        StakeRecord {
            amount: Amount::from_tokens(tokens),
            timestamp: Timestamp::new(at),
            reward_rate: 10,
        }
    }

    #[test]
    fn one_year_at_ten_percent() {
        let schedule = RewardSchedule::default();
        let reward = schedule
            .accrued_checked(&record(1_000, 0), Timestamp::new(YEAR))
            .unwrap();
        assert_eq!(reward, Amount::from_tokens(100));
    }

    #[test]
    fn zero_elapsed_yields_zero() {
        let schedule = RewardSchedule::default();
        let reward = schedule
            .accrued_checked(&record(1_000, 500), Timestamp::new(500))
            .unwrap();
        assert_eq!(reward, Amount::ZERO);
    }

    #[test]
    fn empty_stake_yields_zero() {
        let schedule = RewardSchedule::default();
        let empty = StakeRecord::default();
        assert_eq!(
            schedule.accrued_checked(&empty, Timestamp::new(YEAR)),
            Some(Amount::ZERO)
        );
    }

    #[test]
    fn clock_behind_record_yields_zero() {
        let schedule = RewardSchedule::default();
        let reward = schedule
            .accrued_checked(&record(1_000, 1_000), Timestamp::new(10))
            .unwrap();
        assert_eq!(reward, Amount::ZERO);
    }

    #[test]
    fn truncates_small_rewards() {
        let schedule = RewardSchedule::default();
        let tiny = StakeRecord {
            amount: Amount::new(1),
            timestamp: Timestamp::new(0),
            reward_rate: 10,
        };
        assert_eq!(
            schedule.accrued_checked(&tiny, Timestamp::new(YEAR)),
            Some(Amount::ZERO)
        );
    }

    #[test]
    fn overflow_is_reported() {
        let schedule = RewardSchedule::default();
        let huge = StakeRecord {
            amount: Amount::MAX,
            timestamp: Timestamp::new(0),
            reward_rate: 10,
        };
        assert!(schedule.accrued_checked(&huge, Timestamp::new(YEAR)).is_none());
    }

    #[test]
    fn long_accrual_on_large_stake_stays_exact() {
        let schedule = RewardSchedule::default();
        let whale = record(1_000_000_000, 0);
        let reward = schedule
            .accrued_checked(&whale, Timestamp::new(10_000 * YEAR))
            .unwrap();
        assert_eq!(reward, Amount::from_tokens(1_000_000_000_000));
    }

    #[test]
    fn split_division_matches_direct_formula() {
        let schedule = RewardSchedule::default();
        let odd = StakeRecord {
            amount: Amount::new(123_456_789_123_456_789),
            timestamp: Timestamp::new(0),
            reward_rate: 7,
        };
        let elapsed = 987_654_321u64;
        let direct = 123_456_789_123_456_789u128 * 7 * u128::from(elapsed)
            / (u128::from(YEAR) * 100);
        assert_eq!(
            schedule.accrued_checked(&odd, Timestamp::new(elapsed)),
            Some(Amount::new(direct))
        );
    }
}
