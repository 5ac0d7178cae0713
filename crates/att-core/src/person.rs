//! Person identity and classified per-person swipes.
//!
//! Access-control exports identify people by first and last name only, so
//! employees and swipes are joined on a normalized key built from both.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Direction, Swipe};

/// Lowercases for comparison.
///
/// Full Unicode lowercasing turns `İ` into `i` plus U+0307 (combining dot
/// above); the dot is dropped so `MÜƏLLİM` and `müəllim` fold alike.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase().replace('\u{307}', "")
}

/// Lowercases, trims and removes inner spaces.
pub fn normalize_name(name: &str) -> String {
    fold_case(name.trim()).replace(' ', "")
}

/// Key joining employees with their swipes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonKey(String);

impl PersonKey {
    /// Builds the key from a first and last name.
    pub fn from_names(name: &str, last_name: &str) -> Self {
        Self(format!("{}{}", normalize_name(name), normalize_name(last_name)))
    }

    /// Wraps an already-normalized key, e.g. one passed on the command line.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A classified swipe tied to the person who made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSwipe {
    pub person_key: PersonKey,
    pub name: String,
    pub last_name: String,
    pub timestamp: NaiveDateTime,
    pub direction: Direction,
}

impl PersonSwipe {
    pub fn new(
        name: &str,
        last_name: &str,
        timestamp: NaiveDateTime,
        direction: Direction,
    ) -> Self {
        Self {
            person_key: PersonKey::from_names(name, last_name),
            name: name.to_string(),
            last_name: last_name.to_string(),
            timestamp,
            direction,
        }
    }
}

impl Swipe for PersonSwipe {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// An employee eligible for attendance reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Employee {
    pub fn key(&self) -> PersonKey {
        PersonKey::from_names(&self.name, &self.last_name)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}
