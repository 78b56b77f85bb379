//! Bearer credentials for venue APIs.
//!
//! Tokens are held as [`SecretString`] and never appear in `Debug` output
//! or logs.

use secrecy::{ExposeSecret, SecretString};

/// A bearer token sent as `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Builds a token from an optional configured value, treating blank as absent.
    pub fn from_config(value: Option<&str>) -> Option<Self> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}
