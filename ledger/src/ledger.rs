//! Balances, total supply and the raw value-move primitive.
//!
//! The ledger knows nothing about tax. Every move it performs emits exactly
//! one [`LedgerEvent::Transfer`] into the caller-provided event buffer.

use crate::error::LedgerError;
use crate::event::LedgerEvent;
use levy_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Account balances and the supply counter.
///
/// `Address::ZERO` is the mint/burn sentinel: it never holds a balance, a
/// move from it creates value and a move to it destroys value.
/// `Address::BURN_SINK` can receive but never spend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
    max_supply: Amount,
}

impl Ledger {
    pub fn new(max_supply: Amount) -> Self {
        Self {
            balances: HashMap::new(),
            total_supply: Amount::ZERO,
            max_supply,
        }
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn max_supply(&self) -> Amount {
        self.max_supply
    }

    /// Every account with a recorded balance.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Sum of every balance, `None` on overflow.
    pub fn sum_of_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(*b))
    }

    /// Amount `account` may move out. Zero for the burn sink.
    pub fn spendable(&self, account: &Address) -> Amount {
        if *account == Address::BURN_SINK {
            Amount::ZERO
        } else {
            self.balance_of(account)
        }
    }

    /// Check that `from` can fund a move of `amount` without mutating anything.
    pub fn ensure_spendable(&self, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        if from.is_zero() || amount.is_zero() {
            return Ok(());
        }
        let available = self.spendable(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *from,
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Check that minting `amount` stays under the ceiling.
    pub fn ensure_mintable(&self, amount: Amount) -> Result<(), LedgerError> {
        let after = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        if after > self.max_supply {
            return Err(LedgerError::SupplyCapExceeded {
                requested: amount,
                total_supply: self.total_supply,
                max_supply: self.max_supply,
            });
        }
        Ok(())
    }

    /// Move `amount` from `from` to `to` as one state transition.
    ///
    /// - `from == ZERO`: credit only, total supply grows (mint).
    /// - `to == ZERO`: debit only, total supply shrinks (burn).
    ///
    /// On error nothing is changed and no event is recorded.
    pub fn move_value(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<(), LedgerError> {
        self.ensure_spendable(&from, amount)?;

        // Validate the credit side before touching the debit side.
        let new_supply = if from.is_zero() {
            self.total_supply
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?
        } else if to.is_zero() {
            self.total_supply
                .checked_sub(amount)
                .ok_or(LedgerError::Overflow)?
        } else {
            self.total_supply
        };
        if !to.is_zero() && from != to {
            self.balance_of(&to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
        }

        if !from.is_zero() {
            let balance = self.balance_of(&from);
            self.balances.insert(from, balance.saturating_sub(amount));
        }
        if !to.is_zero() {
            let balance = self.balance_of(&to);
            self.balances.insert(to, balance + amount);
        }
        self.total_supply = new_supply;

        tracing::trace!(%from, %to, %amount, "ledger move");
        events.push(LedgerEvent::Transfer { from, to, amount });
        Ok(())
    }

    /// Mint new value to `to`, refusing amounts that would exceed max supply.
    pub fn mint(
        &mut self,
        to: Address,
        amount: Amount,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<(), LedgerError> {
        self.ensure_mintable(amount)?;
        self.move_value(Address::ZERO, to, amount, events)
    }

    /// Mint new value to `to` without consulting the ceiling.
    ///
    /// Only the staking reward path uses this, and only under
    /// `SupplyCapPolicy::Unchecked`.
    pub fn mint_uncapped(
        &mut self,
        to: Address,
        amount: Amount,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<(), LedgerError> {
        self.move_value(Address::ZERO, to, amount, events)
    }

    /// Debit `from` and destroy the value.
    pub fn burn(
        &mut self,
        from: Address,
        amount: Amount,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<(), LedgerError> {
        self.move_value(from, Address::ZERO, amount, events)
    }
}
