//! Ledger-level errors.

use levy_types::{Address, Amount};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("insufficient allowance for {spender} on {owner}: need {needed}, have {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("minting {requested} would exceed max supply {max_supply} (current {total_supply})")]
    SupplyCapExceeded {
        requested: Amount,
        total_supply: Amount,
        max_supply: Amount,
    },

    #[error("arithmetic overflow in ledger computation")]
    Overflow,
}
