//! Mapping raw reader names to swipe directions.
//!
//! Turnstile controllers report the reader that fired, not the direction, so a
//! classifier decides which readers count as entries and which as exits. The
//! rule has changed several times, so every rule is a [`DirectionClassifier`]
//! and deployments pick one through [`ClassifierConfig`].
//!
//! Swipes whose reader cannot be classified are dropped by the caller and
//! never reach [`crate::reconstruct`].

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Direction;

/// First run of ASCII digits in a reader name.
static READER_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Decides the direction of a swipe from the name of the reader that saw it.
pub trait DirectionClassifier: Send + Sync {
    /// Returns the direction for `reader_name`, or `None` when unknown.
    fn classify(&self, reader_name: &str) -> Option<Direction>;
}

/// Numbered readers: 1 and 2 are entry readers, 3 and 4 are exit readers.
///
/// `"Building A-1"` is an entry, `"Building A-3"` an exit. Only the first
/// number in the name is considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderNumberClassifier;

impl DirectionClassifier for ReaderNumberClassifier {
    fn classify(&self, reader_name: &str) -> Option<Direction> {
        let number: u64 = READER_NUMBER_RE.find(reader_name)?.as_str().parse().ok()?;
        match number {
            1 | 2 => Some(Direction::In),
            3 | 4 => Some(Direction::Out),
            _ => None,
        }
    }
}

/// Readers tagged with `-in` / `-out` in their name (case-insensitive).
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixClassifier;

impl DirectionClassifier for SuffixClassifier {
    fn classify(&self, reader_name: &str) -> Option<Direction> {
        let lower = reader_name.to_lowercase();
        if lower.contains("-out") {
            Some(Direction::Out)
        } else if lower.contains("-in") {
            Some(Direction::In)
        } else {
            None
        }
    }
}

/// Explicit reader names per direction.
#[derive(Debug, Clone, Default)]
pub struct AllowListClassifier {
    in_readers: HashSet<String>,
    out_readers: HashSet<String>,
}

impl AllowListClassifier {
    /// Builds a classifier from the entry and exit reader names.
    pub fn new<I, O>(in_readers: I, out_readers: O) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        O: IntoIterator,
        O::Item: AsRef<str>,
    {
        Self {
            in_readers: in_readers
                .into_iter()
                .map(|r| r.as_ref().trim().to_string())
                .collect(),
            out_readers: out_readers
                .into_iter()
                .map(|r| r.as_ref().trim().to_string())
                .collect(),
        }
    }
}

impl DirectionClassifier for AllowListClassifier {
    fn classify(&self, reader_name: &str) -> Option<Direction> {
        let name = reader_name.trim();
        if self.in_readers.contains(name) {
            Some(Direction::In)
        } else if self.out_readers.contains(name) {
            Some(Direction::Out)
        } else {
            None
        }
    }
}

/// Serializable choice of classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierConfig {
    #[default]
    ReaderNumber,
    Suffix,
    AllowList {
        #[serde(default)]
        in_readers: Vec<String>,
        #[serde(default)]
        out_readers: Vec<String>,
    },
}

impl ClassifierConfig {
    /// Builds the classifier this configuration describes.
    pub fn build(&self) -> Box<dyn DirectionClassifier> {
        match self {
            Self::ReaderNumber => Box::new(ReaderNumberClassifier),
            Self::Suffix => Box::new(SuffixClassifier),
            Self::AllowList {
                in_readers,
                out_readers,
            } => Box::new(AllowListClassifier::new(in_readers, out_readers)),
        }
    }
}
