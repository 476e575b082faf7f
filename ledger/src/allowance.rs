//! Delegated-spend allowances.

use crate::error::LedgerError;
use crate::event::LedgerEvent;
use levy_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `(owner, spender) -> remaining allowance`.
///
/// An allowance of [`Amount::MAX`] is unlimited and never decremented.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Allowances {
    approvals: HashMap<(Address, Address), Amount>,
}

impl Allowances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.approvals
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Set (overwrite) the allowance.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
        events: &mut Vec<LedgerEvent>,
    ) {
        if amount.is_zero() {
            self.approvals.remove(&(owner, spender));
        } else {
            self.approvals.insert((owner, spender), amount);
        }
        events.push(LedgerEvent::Approval {
            owner,
            spender,
            amount,
        });
    }

    pub fn ensure(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<(), LedgerError> {
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Consume `amount` of allowance.
    pub fn spend(&mut self, owner: Address, spender: Address, amount: Amount) -> Result<(), LedgerError> {
        self.ensure(&owner, &spender, amount)?;
        let current = self.allowance(&owner, &spender);
        if current == Amount::MAX {
            return Ok(());
        }
        let remaining = current.saturating_sub(amount);
        if remaining.is_zero() {
            self.approvals.remove(&(owner, spender));
        } else {
            self.approvals.insert((owner, spender), remaining);
        }
        Ok(())
    }
}
