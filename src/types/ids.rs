// src/types/ids.rs

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for Notion identifiers with phantom types.
///
/// A `PageId` can never be passed where a `DatabaseId` is expected, even
/// though both are 32 hex characters on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseMarker;

pub type PageId = Id<PageMarker>;
pub type DatabaseId = Id<DatabaseMarker>;

impl<T> Id<T> {
    /// Parse a Notion ID, accepting the dashed and undashed hex forms.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().replace('-', "");

        if normalized.len() != 32 {
            return Err(ValidationError::InvalidId {
                reason: format!("expected 32 hex characters, got {}", normalized.len()),
            });
        }

        if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidId {
                reason: "ID must contain only hexadecimal characters".to_string(),
            });
        }

        Ok(Self {
            value: normalized.to_lowercase(),
            _phantom: PhantomData,
        })
    }

    /// Get the ID as a string reference.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}
