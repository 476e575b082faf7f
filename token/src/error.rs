//! The public error taxonomy.
//!
//! Lower crates keep their own error enums; each converts into the matching
//! flat variant here so callers can match on the kind directly.

use levy_governance::GovernanceError;
use levy_ledger::LedgerError;
use levy_staking::StakingError;
use levy_types::{Address, Amount, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
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

    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("insufficient stake for {account}: requested {requested}, staked {staked}")]
    InsufficientStake {
        account: Address,
        requested: Amount,
        staked: Amount,
    },

    #[error("proposal {0} does not exist")]
    InvalidProposal(u64),

    #[error("voting on proposal {proposal_id} closed at {deadline}")]
    VotingClosed { proposal_id: u64, deadline: Timestamp },

    #[error("{voter} has already voted on proposal {proposal_id}")]
    AlreadyVoted { proposal_id: u64, voter: Address },

    #[error("{0} has no voting power")]
    NoVotingPower(Address),

    #[error("re-entrant call rejected while a staking operation is in progress")]
    ReentrancyRejected,

    #[error("{0} cannot act as a caller or recipient")]
    InvalidAccount(Address),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("minting {requested} would exceed max supply {max_supply} (current {total_supply})")]
    SupplyCapExceeded {
        requested: Amount,
        total_supply: Amount,
        max_supply: Amount,
    },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl From<LedgerError> for TokenError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance {
                account,
                needed,
                available,
            } => Self::InsufficientBalance {
                account,
                needed,
                available,
            },
            LedgerError::InsufficientAllowance {
                owner,
                spender,
                needed,
                available,
            } => Self::InsufficientAllowance {
                owner,
                spender,
                needed,
                available,
            },
            LedgerError::SupplyCapExceeded {
                requested,
                total_supply,
                max_supply,
            } => Self::SupplyCapExceeded {
                requested,
                total_supply,
                max_supply,
            },
            LedgerError::Overflow => Self::Overflow,
        }
    }
}

impl From<StakingError> for TokenError {
    fn from(e: StakingError) -> Self {
        match e {
            StakingError::ZeroAmount => Self::InvalidAmount,
            StakingError::InsufficientStake {
                account,
                requested,
                staked,
            } => Self::InsufficientStake {
                account,
                requested,
                staked,
            },
            StakingError::Overflow => Self::Overflow,
        }
    }
}

impl From<GovernanceError> for TokenError {
    fn from(e: GovernanceError) -> Self {
        match e {
            GovernanceError::InsufficientBalance {
                proposer,
                have,
                need,
            } => Self::InsufficientBalance {
                account: proposer,
                needed: need,
                available: have,
            },
            GovernanceError::InvalidProposal(id) => Self::InvalidProposal(id),
            GovernanceError::VotingClosed {
                proposal_id,
                deadline,
            } => Self::VotingClosed {
                proposal_id,
                deadline,
            },
            GovernanceError::AlreadyVoted { proposal_id, voter } => {
                Self::AlreadyVoted { proposal_id, voter }
            }
            GovernanceError::NoVotingPower(voter) => Self::NoVotingPower(voter),
            GovernanceError::Overflow => Self::Overflow,
        }
    }
}

impl From<bincode::Error> for TokenError {
    fn from(e: bincode::Error) -> Self {
        Self::Snapshot(e.to_string())
    }
}
