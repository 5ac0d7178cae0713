//! Swipe direction enum as the single source of truth for direction strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Which way a person passed the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Returns true for [`Direction::In`].
    pub const fn is_in(self) -> bool {
        matches!(self, Self::In)
    }

    /// Human-readable form: `Entry` or `Exit`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::In => "Entry",
            Self::Out => "Exit",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::In => "in",
            Self::Out => "out",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "entry" => Ok(Self::In),
            "out" | "exit" => Ok(Self::Out),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

impl Serialize for Direction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown direction strings.
#[derive(Debug, Clone, Error)]
#[error("unknown direction: {0}")]
pub struct UnknownDirection(String);
