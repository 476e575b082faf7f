//! The levy token: a balance ledger with transfer tax, staking rewards and
//! token-weighted governance behind one synchronous operation surface.
//!
//! Every public operation on [`Token`] is a single all-or-nothing state
//! transition: it validates, moves value through the ledger (via the tax
//! router where applicable), updates staking or governance state, and only
//! then publishes its events. A rejected call changes nothing and publishes
//! nothing.

pub mod config;
pub mod dormant;
pub mod error;
pub mod guard;
pub mod token;

pub use config::{Distribution, TokenConfig};
pub use dormant::{CommunityRewardPool, VestingSchedule};
pub use error::TokenError;
pub use guard::ReentrancyGuard;
pub use token::{Token, TokenState, TokenSummary};

pub use levy_ledger::{LedgerEvent, TaxSplit};
pub use levy_types::{Address, Amount, LedgerParams, SupplyCapPolicy, Timestamp};
