//! Error types for chain operations.

use std::fmt;

/// Which layers a failed operation consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only layer 0 was consulted.
    FirstLayer,
    /// Every layer was consulted.
    AllLayers,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::FirstLayer => f.write_str(" in the first layer"),
            Scope::AllLayers => Ok(()),
        }
    }
}

/// Errors raised by [`ChainMap`](crate::ChainMap) operations.
///
/// Errors are never recovered internally. Operations that take a default
/// (`get_or`, `pop_or`) or only answer a question (`contains_key`) never fail.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error<K> {
    /// The key is absent from every layer the operation consulted.
    #[error("key not found{scope}: {key:?}")]
    MissingKey { key: K, scope: Scope },

    /// Layer 0 has no entries to remove.
    #[error("no keys found in the first layer")]
    EmptyMapping,
}

impl<K> Error<K> {
    pub fn missing(key: K) -> Self {
        Error::MissingKey {
            key,
            scope: Scope::AllLayers,
        }
    }

    pub fn missing_in_first_layer(key: K) -> Self {
        Error::MissingKey {
            key,
            scope: Scope::FirstLayer,
        }
    }

    /// The key that was not found, if this is a `MissingKey` error.
    pub fn key(&self) -> Option<&K> {
        match self {
            Error::MissingKey { key, .. } => Some(key),
            Error::EmptyMapping => None,
        }
    }

    pub fn into_key(self) -> Option<K> {
        match self {
            Error::MissingKey { key, .. } => Some(key),
            Error::EmptyMapping => None,
        }
    }

    pub fn is_missing_key(&self) -> bool {
        matches!(self, Error::MissingKey { .. })
    }
}
