use levy_types::{Address, Amount, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("{proposer} cannot propose: balance {have}, threshold {need}")]
    InsufficientBalance {
        proposer: Address,
        have: Amount,
        need: Amount,
    },

    #[error("proposal {0} does not exist")]
    InvalidProposal(u64),

    #[error("voting on proposal {proposal_id} closed at {deadline}")]
    VotingClosed { proposal_id: u64, deadline: Timestamp },

    #[error("{voter} has already voted on proposal {proposal_id}")]
    AlreadyVoted { proposal_id: u64, voter: Address },

    #[error("{0} has no voting power")]
    NoVotingPower(Address),

    #[error("arithmetic overflow in vote tally")]
    Overflow,
}
