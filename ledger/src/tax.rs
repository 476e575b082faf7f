//! Transfer-time tax routing.
//!
//! A routed transfer between two ordinary accounts is decomposed into three
//! ledger moves: the burned half of the tax to the burn sink, the remaining
//! half to the treasury, and the net amount to the recipient. The sub-moves
//! go straight to [`Ledger::move_value`] and are never routed again.

use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::ledger::Ledger;
use levy_types::{Address, Amount, LedgerParams};
use serde::{Deserialize, Serialize};

/// Tax rate as an integer fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    pub rate: u64,
    pub divisor: u64,
}

/// How one routed amount is divided.
///
/// `burn_share + treasury_share == tax` and `tax + net_amount == amount`
/// hold by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSplit {
    pub tax: Amount,
    pub burn_share: Amount,
    pub treasury_share: Amount,
    pub net_amount: Amount,
}

impl TaxPolicy {
    pub fn from_params(params: &LedgerParams) -> Self {
        Self {
            rate: params.tax_rate,
            divisor: params.tax_divisor,
        }
    }

    /// Split `amount` with truncating integer division.
    ///
    /// `tax = floor(amount * rate / divisor)`, `burn = floor(tax / 2)`,
    /// `treasury = tax - burn`, `net = amount - tax`.
    pub fn split(&self, amount: Amount) -> Result<TaxSplit, LedgerError> {
        if self.divisor == 0 {
            return Err(LedgerError::Overflow);
        }
        let tax_raw = amount
            .raw()
            .checked_mul(u128::from(self.rate))
            .ok_or(LedgerError::Overflow)?
            / u128::from(self.divisor);
        let tax = Amount::new(tax_raw);
        let burn_share = Amount::new(tax_raw / 2);
        let treasury_share = tax.checked_sub(burn_share).ok_or(LedgerError::Overflow)?;
        let net_amount = amount.checked_sub(tax).ok_or(LedgerError::Overflow)?;
        Ok(TaxSplit {
            tax,
            burn_share,
            treasury_share,
            net_amount,
        })
    }
}

/// Routes ordinary transfers through the tax policy.
///
/// Moves touching the mint/burn sentinel, the owner, the treasury or the
/// burn sink are exempt and pass through unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaxRouter {
    policy: TaxPolicy,
    owner: Address,
    treasury: Address,
}

impl TaxRouter {
    pub fn new(policy: TaxPolicy, owner: Address, treasury: Address) -> Self {
        Self {
            policy,
            owner,
            treasury,
        }
    }

    pub fn policy(&self) -> TaxPolicy {
        self.policy
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn burn_sink(&self) -> Address {
        Address::BURN_SINK
    }

    fn is_privileged(&self, account: &Address) -> bool {
        account.is_zero()
            || *account == self.owner
            || *account == self.treasury
            || *account == Address::BURN_SINK
    }

    /// Whether a move between these endpoints skips the tax.
    pub fn is_exempt(&self, from: &Address, to: &Address) -> bool {
        self.is_privileged(from) || self.is_privileged(to)
    }

    /// The split a routed move would apply, or `None` if it is exempt.
    pub fn preview(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<Option<TaxSplit>, LedgerError> {
        if self.is_exempt(from, to) {
            return Ok(None);
        }
        self.policy.split(amount).map(Some)
    }

    /// Perform a routed transfer.
    ///
    /// Returns the applied split, or `None` for an exempt move. The sender's
    /// balance is checked against the gross amount up front, so either all
    /// sub-moves happen or none do.
    pub fn route(
        &self,
        ledger: &mut Ledger,
        from: Address,
        to: Address,
        amount: Amount,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<Option<TaxSplit>, LedgerError> {
        let Some(split) = self.preview(&from, &to, amount)? else {
            ledger.move_value(from, to, amount, events)?;
            tracing::debug!(%from, %to, %amount, "exempt transfer");
            return Ok(None);
        };

        ledger.ensure_spendable(&from, amount)?;

        if !split.burn_share.is_zero() {
            ledger.move_value(from, Address::BURN_SINK, split.burn_share, events)?;
        }
        if !split.treasury_share.is_zero() {
            ledger.move_value(from, self.treasury, split.treasury_share, events)?;
        }
        ledger.move_value(from, to, split.net_amount, events)?;

        events.push(LedgerEvent::TaxCollected {
            from,
            tax: split.tax,
            burn_share: split.burn_share,
            treasury_share: split.treasury_share,
            net_amount: split.net_amount,
        });
        tracing::debug!(
            %from,
            %to,
            %amount,
            tax = %split.tax,
            net = %split.net_amount,
            "taxed transfer"
        );
        Ok(Some(split))
    }
}
