//! Staking-specific errors.

use levy_types::{Address, Amount};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakingError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient stake for {account}: requested {requested}, staked {staked}")]
    InsufficientStake {
        account: Address,
        requested: Amount,
        staked: Amount,
    },

    #[error("arithmetic overflow in staking computation")]
    Overflow,
}
