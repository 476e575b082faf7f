//! Governance proposals and their lifecycle.

use levy_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a proposal is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// `now <= deadline`: votes are accepted.
    Open,
    /// `now > deadline`: no further votes.
    Closed,
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Sequential id, starting at 1.
    pub id: u64,
    pub description: String,
    /// Sum of the weights of supporting votes.
    pub vote_count: Amount,
    pub deadline: Timestamp,
    /// No operation sets this; there is no execution path.
    pub executed: bool,
    pub proposer: Address,
    /// Every address that has voted, for or against.
    pub voters: BTreeSet<Address>,
}

impl Proposal {
    pub fn new(id: u64, description: String, proposer: Address, deadline: Timestamp) -> Self {
        Self {
            id,
            description,
            vote_count: Amount::ZERO,
            deadline,
            executed: false,
            proposer,
            voters: BTreeSet::new(),
        }
    }

    pub fn status(&self, now: Timestamp) -> ProposalStatus {
        if now > self.deadline {
            ProposalStatus::Closed
        } else {
            ProposalStatus::Open
        }
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }
}
