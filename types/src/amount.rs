//! Token amount type.
//!
//! Amounts are fixed-point integers (u128) with 18 fractional decimal digits,
//! so one whole token is `10^18` raw units. All ledger arithmetic happens on the
//! raw integer; the decimal form is only for display and configuration.

use crate::error::TypesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Number of fractional decimal digits.
pub const DECIMALS: u8 = 18;

/// Raw units in one whole token.
pub const TOKEN_UNIT: u128 = 1_000_000_000_000_000_000;

/// A token amount in raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens to raw units.
    pub const fn from_tokens(tokens: u64) -> Self {
        Self(tokens as u128 * TOKEN_UNIT)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / TOKEN_UNIT;
        let frac = self.0 % TOKEN_UNIT;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:018}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Amount {
    type Err = TypesError;

    /// Parse a token-denominated decimal such as `"1000"` or `"0.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidAmount(s.to_string());
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > DECIMALS as usize || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.contains('.') && frac.is_empty() {
            return Err(invalid());
        }
        let whole: u128 = whole.parse().map_err(|_| invalid())?;
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            format!("{frac:0<18}").parse().map_err(|_| invalid())?
        };
        whole
            .checked_mul(TOKEN_UNIT)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_whole_and_fractional() {
        assert_eq!(Amount::from_tokens(49).to_string(), "49");
        assert_eq!(Amount::new(TOKEN_UNIT / 2).to_string(), "0.5");
        assert_eq!(Amount::new(1).to_string(), "0.000000000000000001");
        assert_eq!(Amount::ZERO.to_string(), "0");
    }

    #[test]
    fn parse_decimal_forms() {
        assert_eq!("50".parse::<Amount>().unwrap(), Amount::from_tokens(50));
        assert_eq!("0.5".parse::<Amount>().unwrap(), Amount::new(TOKEN_UNIT / 2));
        assert_eq!(
            "1.000000000000000001".parse::<Amount>().unwrap(),
            Amount::new(TOKEN_UNIT + 1)
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", ".5", "1.", "-1", "1.2.3", "abc", "1.0000000000000000001"] {
            assert!(bad.parse::<Amount>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        let too_big = format!("{}", u128::MAX);
        assert!(too_big.parse::<Amount>().is_err());
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(Amount::MAX.checked_add(Amount::new(1)), None);
        assert_eq!(Amount::ZERO.checked_sub(Amount::new(1)), None);
        assert_eq!(Amount::new(5).saturating_sub(Amount::new(9)), Amount::ZERO);
        assert_eq!(Amount::new(5) + Amount::new(4), Amount::new(9));
    }
}
