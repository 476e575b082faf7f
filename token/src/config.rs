//! Token configuration with TOML file support.

use serde::{Deserialize, Serialize};

use levy_types::{Address, Amount, LedgerParams};

use crate::TokenError;

/// Construction-time configuration for a [`crate::Token`].
///
/// Can be loaded from a TOML file via [`TokenConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// The system owner. Tax-exempt; receives the owner allocation.
    #[serde(default = "default_owner")]
    pub owner: Address,

    /// The treasury sink. Tax-exempt; receives the non-burned half of tax.
    #[serde(default = "default_treasury")]
    pub treasury: Address,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Tax, reward, governance and supply constants.
    #[serde(default)]
    pub params: LedgerParams,

    /// What is minted at construction.
    #[serde(default)]
    pub distribution: Distribution,
}

/// Initial mints performed when the token is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distribution {
    /// Minted to the owner.
    pub owner_allocation: Amount,
    /// Minted to the system account and recorded as the community pool.
    ///
    /// The system account also holds staked principal. Deposits are taxed
    /// on the way in but withdrawn gross, so this allocation is what covers
    /// the difference. With a zero pool and a non-zero tax, the last
    /// withdrawals fail with `InsufficientBalance`.
    pub community_pool: Amount,
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            owner_allocation: Amount::from_tokens(400_000_000),
            community_pool: Amount::from_tokens(100_000_000),
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_name() -> String {
    "Levy".to_string()
}

fn default_symbol() -> String {
    "LEVY".to_string()
}

fn default_owner() -> Address {
    Address::derive("owner")
}

fn default_treasury() -> Address {
    Address::derive("treasury")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl TokenConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, TokenError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TokenError::InvalidConfiguration(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, TokenError> {
        toml::from_str(s).map_err(|e| TokenError::InvalidConfiguration(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, TokenError> {
        toml::to_string_pretty(self).map_err(|e| TokenError::InvalidConfiguration(e.to_string()))
    }

    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> Result<(), TokenError> {
        let invalid = |msg: String| Err(TokenError::InvalidConfiguration(msg));
        let reserved = [Address::ZERO, Address::BURN_SINK, Address::SYSTEM];

        if reserved.contains(&self.owner) {
            return invalid(format!("owner {} is a reserved address", self.owner));
        }
        if reserved.contains(&self.treasury) {
            return invalid(format!("treasury {} is a reserved address", self.treasury));
        }
        if self.treasury == self.owner {
            return invalid("treasury must differ from owner".to_string());
        }

        let p = &self.params;
        if p.tax_divisor == 0 || p.tax_rate > p.tax_divisor {
            return invalid(format!(
                "tax rate {}/{} is not a fraction in [0, 1]",
                p.tax_rate, p.tax_divisor
            ));
        }
        if p.reward_interval_secs == 0 {
            return invalid("reward interval must be non-zero".to_string());
        }
        let minted = self
            .distribution
            .owner_allocation
            .checked_add(self.distribution.community_pool)
            .ok_or(TokenError::Overflow)?;
        if self.distribution.community_pool.is_zero() && p.tax_rate > 0 {
            tracing::warn!(
                tax_rate = p.tax_rate,
                "no community pool: taxed stake deposits leave the staking pool short"
            );
        }
        if minted > p.max_supply {
            return invalid(format!(
                "initial distribution {minted} exceeds max supply {}",
                p.max_supply
            ));
        }
        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            owner: default_owner(),
            treasury: default_treasury(),
            params: LedgerParams::default(),
            distribution: Distribution::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        TokenConfig::default().validate().unwrap();
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let config = TokenConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(TokenConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config = TokenConfig::from_toml_str(
            r#"
            symbol = "TST"
            treasury = "0x00000000000000000000000000000000000000aa"

            [params]
            tax_rate = 100
            proposal_threshold = "5"
            "#,
        )
        .unwrap();
        assert_eq!(config.symbol, "TST");
        assert_eq!(config.name, "Levy");
        assert_eq!(config.params.tax_rate, 100);
        assert_eq!(config.params.tax_divisor, 10_000);
        assert_eq!(config.params.proposal_threshold, Amount::from_tokens(5));
        assert_eq!(config.distribution, Distribution::default());
    }

    #[test]
    fn empty_community_pool_is_allowed() {
        let mut config = TokenConfig::default();
        config.distribution.community_pool = Amount::ZERO;
        config.validate().unwrap();
    }

    #[test]
    fn zero_treasury_is_rejected() {
        let config = TokenConfig {
            treasury: Address::ZERO,
            ..TokenConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TokenError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn treasury_equal_to_owner_is_rejected() {
        let config = TokenConfig {
            treasury: Address::derive("owner"),
            ..TokenConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn distribution_over_cap_is_rejected() {
        let mut config = TokenConfig::default();
        config.distribution.owner_allocation = config.params.max_supply;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_tax_fraction_is_rejected() {
        let mut config = TokenConfig::default();
        config.params.tax_rate = 20_000;
        assert!(config.validate().is_err());
    }
}
