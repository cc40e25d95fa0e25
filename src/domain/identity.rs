//! Caller identity.
//!
//! An [`Identity`] names the actor invoking a registry operation. The
//! "no controller" state is modelled as `Option<Identity>::None`, so no
//! real identity value can collide with it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::RegistryError;

/// Opaque, non-empty identifier of a caller (for example an account
/// address such as `"0x70997970..."`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Creates an `Identity`, rejecting empty or all-whitespace values.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidRequest`] if `id` is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, RegistryError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RegistryError::InvalidRequest(
                "caller identity must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
