//! Core staking engine.

use crate::error::StakingError;
use crate::reward::RewardSchedule;
use crate::stake::StakeRecord;
use levy_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Owns stake records and the aggregate staked total.
///
/// The engine only does bookkeeping. Moving principal into and out of the
/// pool and minting rewards is the caller's job; the engine tells it how
/// much and records the outcome.
///
/// Invariant: `total_staked == Σ records[*].amount`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakingEngine {
    records: HashMap<Address, StakeRecord>,
    total_staked: Amount,
    schedule: RewardSchedule,
}

impl StakingEngine {
    pub fn new(schedule: RewardSchedule) -> Self {
        Self {
            records: HashMap::new(),
            total_staked: Amount::ZERO,
            schedule,
        }
    }

    pub fn schedule(&self) -> RewardSchedule {
        self.schedule
    }

    /// The stake record for `account` (all-zero if it never staked).
    pub fn stake_of(&self, account: &Address) -> StakeRecord {
        self.records.get(account).copied().unwrap_or_default()
    }

    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    /// Accounts with a non-zero stake.
    pub fn stakers(&self) -> impl Iterator<Item = (&Address, &StakeRecord)> {
        self.records.iter().filter(|(_, r)| r.is_active())
    }

    /// Reward `account` would receive if settled at `now`. No side effects.
    pub fn pending_reward(&self, account: &Address, now: Timestamp) -> Result<Amount, StakingError> {
        self.schedule
            .accrued_checked(&self.stake_of(account), now)
            .ok_or(StakingError::Overflow)
    }

    /// Restart the accrual window after a non-zero reward has been paid.
    pub fn mark_settled(&mut self, account: &Address, now: Timestamp) {
        if let Some(record) = self.records.get_mut(account) {
            record.timestamp = now;
        }
    }

    /// Validate a deposit without recording it.
    pub fn check_stake(&self, account: &Address, amount: Amount) -> Result<(), StakingError> {
        if amount.is_zero() {
            return Err(StakingError::ZeroAmount);
        }
        self.stake_of(account)
            .amount
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        self.total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        Ok(())
    }

    /// Validate a withdrawal without recording it.
    pub fn check_unstake(&self, account: &Address, amount: Amount) -> Result<(), StakingError> {
        if amount.is_zero() {
            return Err(StakingError::ZeroAmount);
        }
        let staked = self.stake_of(account).amount;
        if amount > staked {
            return Err(StakingError::InsufficientStake {
                account: *account,
                requested: amount,
                staked,
            });
        }
        Ok(())
    }

    /// Record a deposit: grow the principal, restart the accrual window at
    /// `now`, and capture the current rate.
    pub fn record_stake(
        &mut self,
        account: Address,
        amount: Amount,
        now: Timestamp,
    ) -> Result<StakeRecord, StakingError> {
        self.check_stake(&account, amount)?;
        let previous = self.stake_of(&account);
        let record = StakeRecord {
            amount: previous.amount.checked_add(amount).ok_or(StakingError::Overflow)?,
            timestamp: now,
            reward_rate: self.schedule.rate_percent,
        };
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        self.records.insert(account, record);
        tracing::debug!(%account, %amount, staked = %record.amount, "stake recorded");
        Ok(record)
    }

    /// Record a withdrawal of `amount` from the principal.
    pub fn record_unstake(
        &mut self,
        account: Address,
        amount: Amount,
    ) -> Result<StakeRecord, StakingError> {
        self.check_unstake(&account, amount)?;
        let mut record = self.stake_of(&account);
        record.amount = record.amount.saturating_sub(amount);
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(StakingError::Overflow)?;
        self.records.insert(account, record);
        tracing::debug!(%account, %amount, staked = %record.amount, "unstake recorded");
        Ok(record)
    }
}

impl Default for StakingEngine {
    fn default() -> Self {
        Self::new(RewardSchedule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: u64 = 365 * 24 * 3600;

    fn test_address(n: u8) -> Address {
        Address::derive(&format!("staker{n}"))
    }

    fn test_timestamp(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    #[test]
    fn stake_creates_record_and_grows_total() {
        let mut engine = StakingEngine::default();
        let staker = test_address(1);

        let record = engine
            .record_stake(staker, Amount::from_tokens(100), test_timestamp(10))
            .unwrap();

        assert_eq!(record.amount, Amount::from_tokens(100));
        assert_eq!(record.timestamp, test_timestamp(10));
        assert_eq!(record.reward_rate, 10);
        assert_eq!(engine.total_staked(), Amount::from_tokens(100));
    }

    #[test]
    fn top_up_accumulates_and_restarts_window() {
        let mut engine = StakingEngine::default();
        let staker = test_address(1);
        engine
            .record_stake(staker, Amount::from_tokens(100), test_timestamp(10))
            .unwrap();
        let record = engine
            .record_stake(staker, Amount::from_tokens(50), test_timestamp(99))
            .unwrap();

        assert_eq!(record.amount, Amount::from_tokens(150));
        assert_eq!(record.timestamp, test_timestamp(99));
        assert_eq!(engine.total_staked(), Amount::from_tokens(150));
    }

    #[test]
    fn zero_stake_is_rejected() {
        let mut engine = StakingEngine::default();
        let err = engine
            .record_stake(test_address(1), Amount::ZERO, test_timestamp(0))
            .unwrap_err();
        assert_eq!(err, StakingError::ZeroAmount);
        assert_eq!(engine.total_staked(), Amount::ZERO);
    }

    #[test]
    fn unstake_beyond_principal_is_rejected() {
        let mut engine = StakingEngine::default();
        let staker = test_address(1);
        engine
            .record_stake(staker, Amount::from_tokens(10), test_timestamp(0))
            .unwrap();

        let err = engine
            .record_unstake(staker, Amount::from_tokens(11))
            .unwrap_err();
        match err {
            StakingError::InsufficientStake { requested, staked, .. } => {
                assert_eq!(requested, Amount::from_tokens(11));
                assert_eq!(staked, Amount::from_tokens(10));
            }
            other => panic!("expected InsufficientStake, got {other:?}"),
        }
        assert_eq!(engine.total_staked(), Amount::from_tokens(10));
    }

    #[test]
    fn full_unstake_leaves_zero_record() {
        let mut engine = StakingEngine::default();
        let staker = test_address(1);
        engine
            .record_stake(staker, Amount::from_tokens(10), test_timestamp(0))
            .unwrap();
        engine.record_unstake(staker, Amount::from_tokens(10)).unwrap();

        assert!(!engine.stake_of(&staker).is_active());
        assert_eq!(engine.total_staked(), Amount::ZERO);
        assert_eq!(engine.stakers().count(), 0);
        assert_eq!(
            engine.pending_reward(&staker, test_timestamp(YEAR)).unwrap(),
            Amount::ZERO
        );
    }

    #[test]
    fn pending_reward_grows_with_time_and_resets_on_settle() {
        let mut engine = StakingEngine::default();
        let staker = test_address(1);
        engine
            .record_stake(staker, Amount::from_tokens(1_000), test_timestamp(0))
            .unwrap();

        let half = engine.pending_reward(&staker, test_timestamp(YEAR / 2)).unwrap();
        let full = engine.pending_reward(&staker, test_timestamp(YEAR)).unwrap();
        assert_eq!(half, Amount::from_tokens(50));
        assert_eq!(full, Amount::from_tokens(100));

        engine.mark_settled(&staker, test_timestamp(YEAR));
        assert_eq!(
            engine.pending_reward(&staker, test_timestamp(YEAR)).unwrap(),
            Amount::ZERO
        );
    }

    #[test]
    fn total_tracks_sum_of_records() {
        let mut engine = StakingEngine::default();
        for n in 1..=5u8 {
            engine
                .record_stake(test_address(n), Amount::from_tokens(n as u64), test_timestamp(0))
                .unwrap();
        }
        engine.record_unstake(test_address(3), Amount::from_tokens(2)).unwrap();

        let sum = engine
            .stakers()
            .fold(Amount::ZERO, |acc, (_, r)| acc + r.amount);
        assert_eq!(sum, engine.total_staked());
        assert_eq!(sum, Amount::from_tokens(13));
    }
}
