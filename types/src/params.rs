//! Ledger parameters: the tax, reward, governance and supply constants.

use crate::amount::Amount;
use serde::{Deserialize, Serialize};

/// Whether reward mints are held to the maximum-supply ceiling.
///
/// The initial distribution is always checked against the ceiling; this
/// policy only governs the time-proportional staking reward mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyCapPolicy {
    /// A reward that would push supply past `max_supply` rejects the operation.
    Enforce,
    /// Rewards are minted without consulting the ceiling.
    Unchecked,
}

/// All constants the ledger engines read.
///
/// Missing fields in a serialized form fall back to [`LedgerParams::levy_defaults`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerParams {
    // ── Tax ──────────────────────────────────────────────────────────────
    /// Tax numerator. `tax = floor(amount * tax_rate / tax_divisor)`.
    pub tax_rate: u64,

    /// Tax denominator (basis points when 10_000).
    pub tax_divisor: u64,

    // ── Staking ──────────────────────────────────────────────────────────
    /// Reward rate as a whole percentage per `reward_interval_secs`.
    pub reward_rate_percent: u64,

    /// Annualisation period for the reward rate.
    pub reward_interval_secs: u64,

    /// Whether reward mints respect `max_supply`.
    pub reward_cap_policy: SupplyCapPolicy,

    // ── Governance ───────────────────────────────────────────────────────
    /// Minimum balance required to create a proposal.
    pub proposal_threshold: Amount,

    /// Seconds from proposal creation to its voting deadline.
    pub voting_period_secs: u64,

    // ── Supply ───────────────────────────────────────────────────────────
    /// Ceiling on total supply.
    pub max_supply: Amount,
}

impl LedgerParams {
    pub const SECONDS_PER_DAY: u64 = 24 * 3600;

    /// Production defaults: 2% tax, 10% yearly reward, 10k-token proposal
    /// threshold, one-week votes, one-billion-token ceiling.
    pub fn levy_defaults() -> Self {
        Self {
            tax_rate: 200,
            tax_divisor: 10_000,

            reward_rate_percent: 10,
            reward_interval_secs: 365 * Self::SECONDS_PER_DAY,
            reward_cap_policy: SupplyCapPolicy::Unchecked,

            proposal_threshold: Amount::from_tokens(10_000),
            voting_period_secs: 7 * Self::SECONDS_PER_DAY,

            max_supply: Amount::from_tokens(1_000_000_000),
        }
    }
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self::levy_defaults()
    }
}
