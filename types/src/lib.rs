//! Fundamental types for the levy ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, fixed-point amounts, timestamps and the clock seam, and the
//! ledger parameters that every engine reads.

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::{Amount, DECIMALS, TOKEN_UNIT};
pub use error::TypesError;
pub use params::{LedgerParams, SupplyCapPolicy};
pub use time::{Clock, SystemClock, Timestamp};
