//! Token-weighted governance for the levy ledger.
//!
//! Holders at or above the proposal threshold open proposals; any holder
//! with a non-zero balance votes once per proposal before its deadline.
//!
//! Key principle: vote weight is the voter's live balance at the moment of
//! voting. Nothing is snapshotted at proposal creation, so moving tokens
//! between votes moves influence with them.

pub mod engine;
pub mod error;
pub mod proposal;

pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use proposal::{Proposal, ProposalStatus};
