//! Monetary amount held in escrow.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RegistryError;

/// Non-negative amount in the smallest currency unit.
///
/// Serialized as a JSON string so that values above 2^53 survive
/// round-trips through JavaScript clients. Deserialization accepts either
/// a string or an unsigned integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw `u128`.
    #[must_use]
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction, `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Parses a decimal string such as `"100"`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidRequest`] if `raw` is not a valid
    /// unsigned integer.
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        raw.trim()
            .parse::<u128>()
            .map(Self)
            .map_err(|_| RegistryError::InvalidRequest(format!("invalid amount: {raw}")))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(Self(u128::from(n))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount::new(100)).unwrap_or_default();
        assert_eq!(json, "\"100\"");
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let Ok(a) = serde_json::from_str::<Amount>("\"340282366920938463463374607431768211455\"")
        else {
            panic!("u128::MAX should parse");
        };
        assert_eq!(a, Amount::new(u128::MAX));

        let Ok(b) = serde_json::from_str::<Amount>("42") else {
            panic!("integer should parse");
        };
        assert_eq!(b, Amount::new(42));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Amount::parse("-1").is_err());
        assert!(Amount::parse("ten").is_err());
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
        assert_eq!(Amount::ZERO.checked_sub(Amount::new(1)), None);
        assert_eq!(
            Amount::new(5).checked_sub(Amount::new(2)),
            Some(Amount::new(3))
        );
    }
}
