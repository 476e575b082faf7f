//! Account-balance ledger with transfer-time tax routing.
//!
//! - [`Ledger`] owns balances and total supply and exposes the raw value-move
//!   primitive (plus mint and burn through the zero-address sentinel).
//! - [`TaxRouter`] sits on top of the ledger and splits every non-exempt
//!   transfer into burn-sink, treasury-sink and recipient credits.
//! - [`Allowances`] holds delegated-spend approvals.
//! - [`LedgerEvent`] is the notification record every state change produces.

pub mod allowance;
pub mod error;
pub mod event;
pub mod ledger;
pub mod tax;

pub use allowance::Allowances;
pub use error::LedgerError;
pub use event::{EventBus, LedgerEvent};
pub use ledger::Ledger;
pub use tax::{TaxPolicy, TaxRouter, TaxSplit};
