//! Core governance engine: proposal creation and voting.

use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalStatus};
use levy_types::{Address, Amount, LedgerParams, Timestamp};
use serde::{Deserialize, Serialize};

/// Holds every proposal and enforces the threshold, deadline and
/// once-per-voter gates.
///
/// Balances are supplied by the caller at call time; the engine never reads
/// the ledger itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceEngine {
    /// Proposal `id` lives at index `id - 1`.
    proposals: Vec<Proposal>,
    proposal_threshold: Amount,
    voting_period_secs: u64,
}

impl GovernanceEngine {
    pub fn new(proposal_threshold: Amount, voting_period_secs: u64) -> Self {
        Self {
            proposals: Vec::new(),
            proposal_threshold,
            voting_period_secs,
        }
    }

    pub fn from_params(params: &LedgerParams) -> Self {
        Self::new(params.proposal_threshold, params.voting_period_secs)
    }

    pub fn proposal_threshold(&self) -> Amount {
        self.proposal_threshold
    }

    pub fn voting_period_secs(&self) -> u64 {
        self.voting_period_secs
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn proposal(&self, id: u64) -> Option<&Proposal> {
        let index = id.checked_sub(1)?;
        self.proposals.get(usize::try_from(index).ok()?)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Proposals still accepting votes at `now`.
    pub fn open_proposals(&self, now: Timestamp) -> impl Iterator<Item = &Proposal> {
        self.proposals
            .iter()
            .filter(move |p| p.status(now) == ProposalStatus::Open)
    }

    pub fn has_voted(&self, id: u64, voter: &Address) -> bool {
        self.proposal(id).is_some_and(|p| p.has_voted(voter))
    }

    /// Open a new proposal. `balance` is the proposer's current balance.
    ///
    /// Returns the stored proposal.
    pub fn create_proposal(
        &mut self,
        proposer: Address,
        description: String,
        balance: Amount,
        now: Timestamp,
    ) -> Result<&Proposal, GovernanceError> {
        if balance < self.proposal_threshold {
            return Err(GovernanceError::InsufficientBalance {
                proposer,
                have: balance,
                need: self.proposal_threshold,
            });
        }
        let id = self.proposal_count() + 1;
        let deadline = now.plus_secs(self.voting_period_secs);
        self.proposals
            .push(Proposal::new(id, description, proposer, deadline));
        tracing::debug!(id, %proposer, %deadline, "proposal created");
        let index = self.proposals.len() - 1;
        Ok(&self.proposals[index])
    }

    /// Check every vote gate without recording anything.
    pub fn check_vote(
        &self,
        proposal_id: u64,
        voter: &Address,
        balance: Amount,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let proposal = self
            .proposal(proposal_id)
            .ok_or(GovernanceError::InvalidProposal(proposal_id))?;
        if proposal.status(now) == ProposalStatus::Closed {
            return Err(GovernanceError::VotingClosed {
                proposal_id,
                deadline: proposal.deadline,
            });
        }
        if proposal.has_voted(voter) {
            return Err(GovernanceError::AlreadyVoted {
                proposal_id,
                voter: *voter,
            });
        }
        if balance.is_zero() {
            return Err(GovernanceError::NoVotingPower(*voter));
        }
        if support_would_overflow(proposal, balance) {
            return Err(GovernanceError::Overflow);
        }
        Ok(())
    }

    /// Record a vote weighted by `balance`, the voter's balance right now.
    ///
    /// The voter joins the voter set either way; only a supporting vote
    /// adds its weight to `vote_count`. Returns the weight.
    pub fn vote(
        &mut self,
        proposal_id: u64,
        voter: Address,
        support: bool,
        balance: Amount,
        now: Timestamp,
    ) -> Result<Amount, GovernanceError> {
        self.check_vote(proposal_id, &voter, balance, now)?;
        let index = usize::try_from(proposal_id - 1).map_err(|_| GovernanceError::Overflow)?;
        let proposal = &mut self.proposals[index];
        proposal.voters.insert(voter);
        if support {
            proposal.vote_count = proposal
                .vote_count
                .checked_add(balance)
                .ok_or(GovernanceError::Overflow)?;
        }
        tracing::debug!(proposal_id, %voter, support, weight = %balance, "vote recorded");
        Ok(balance)
    }
}

fn support_would_overflow(proposal: &Proposal, weight: Amount) -> bool {
    proposal.vote_count.checked_add(weight).is_none()
}

impl Default for GovernanceEngine {
    fn default() -> Self {
        Self::from_params(&LedgerParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: u64 = 7 * 24 * 3600;

    fn voter(n: u8) -> Address {
        Address::derive(&format!("voter{n}"))
    }

    fn engine_with_proposal() -> GovernanceEngine {
        let mut engine = GovernanceEngine::default();
        engine
            .create_proposal(
                voter(0),
                "raise the treasury share".into(),
                Amount::from_tokens(10_000),
                Timestamp::new(1_000),
            )
            .unwrap();
        engine
    }

    #[test]
    fn create_assigns_sequential_ids_and_deadline() {
        let mut engine = engine_with_proposal();
        let second = engine
            .create_proposal(voter(1), "second".into(), Amount::from_tokens(20_000), Timestamp::new(2_000))
            .unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(second.deadline, Timestamp::new(2_000 + WEEK));
        assert_eq!(second.proposer, voter(1));
        assert_eq!(engine.proposal_count(), 2);
        assert_eq!(engine.proposal(1).unwrap().deadline, Timestamp::new(1_000 + WEEK));
    }

    #[test]
    fn below_threshold_cannot_propose() {
        let mut engine = GovernanceEngine::default();
        let err = engine
            .create_proposal(voter(1), "x".into(), Amount::from_tokens(9_999), Timestamp::new(0))
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::InsufficientBalance {
                proposer: voter(1),
                have: Amount::from_tokens(9_999),
                need: Amount::from_tokens(10_000),
            }
        );
        assert_eq!(engine.proposal_count(), 0);
    }

    #[test]
    fn proposal_lookup_out_of_range() {
        let engine = engine_with_proposal();
        assert!(engine.proposal(0).is_none());
        assert!(engine.proposal(2).is_none());
        assert!(engine.proposal(u64::MAX).is_none());
    }

    #[test]
    fn supporting_vote_adds_weight() {
        let mut engine = engine_with_proposal();
        let weight = engine
            .vote(1, voter(1), true, Amount::from_tokens(300), Timestamp::new(1_500))
            .unwrap();
        assert_eq!(weight, Amount::from_tokens(300));
        assert_eq!(engine.proposal(1).unwrap().vote_count, Amount::from_tokens(300));
        assert!(engine.has_voted(1, &voter(1)));
    }

    #[test]
    fn opposing_vote_is_recorded_without_weight() {
        let mut engine = engine_with_proposal();
        engine
            .vote(1, voter(1), false, Amount::from_tokens(300), Timestamp::new(1_500))
            .unwrap();
        let proposal = engine.proposal(1).unwrap();
        assert_eq!(proposal.vote_count, Amount::ZERO);
        assert!(proposal.has_voted(&voter(1)));
    }

    #[test]
    fn second_vote_is_rejected() {
        let mut engine = engine_with_proposal();
        engine
            .vote(1, voter(1), false, Amount::from_tokens(1), Timestamp::new(1_500))
            .unwrap();
        let err = engine
            .vote(1, voter(1), true, Amount::from_tokens(1), Timestamp::new(1_501))
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::AlreadyVoted {
                proposal_id: 1,
                voter: voter(1)
            }
        );
        assert_eq!(engine.proposal(1).unwrap().vote_count, Amount::ZERO);
    }

    #[test]
    fn vote_gates_in_order() {
        let mut engine = engine_with_proposal();
        let deadline = engine.proposal(1).unwrap().deadline;

        assert_eq!(
            engine.vote(0, voter(1), true, Amount::new(1), Timestamp::new(1_500)),
            Err(GovernanceError::InvalidProposal(0))
        );
        assert_eq!(
            engine.vote(2, voter(1), true, Amount::new(1), Timestamp::new(1_500)),
            Err(GovernanceError::InvalidProposal(2))
        );
        assert_eq!(
            engine.vote(1, voter(1), true, Amount::ZERO, deadline.plus_secs(1)),
            Err(GovernanceError::VotingClosed {
                proposal_id: 1,
                deadline
            })
        );
        assert_eq!(
            engine.vote(1, voter(1), true, Amount::ZERO, deadline),
            Err(GovernanceError::NoVotingPower(voter(1)))
        );
        assert!(engine
            .vote(1, voter(1), true, Amount::new(1), deadline)
            .is_ok());
    }

    #[test]
    fn open_proposals_filters_by_deadline() {
        let mut engine = engine_with_proposal();
        engine
            .create_proposal(voter(1), "later".into(), Amount::from_tokens(10_000), Timestamp::new(1_000 + WEEK))
            .unwrap();
        let now = Timestamp::new(1_000 + WEEK + 1);
        let open: Vec<u64> = engine.open_proposals(now).map(|p| p.id).collect();
        assert_eq!(open, vec![2]);
    }
}
