//! Import command for loading swipes and employees into the local `SQLite` store.

use std::io::BufRead;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use att_core::Employee;
use att_db::{Database, SwipeRecord, format_timestamp, parse_timestamp};

use crate::ImportKind;

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records parsed from the input.
    pub read: usize,
    /// Records written; duplicate swipes are skipped.
    pub written: usize,
}

pub fn run<R: BufRead>(db: &mut Database, kind: ImportKind, reader: R) -> Result<ImportSummary> {
    let summary = match kind {
        ImportKind::Swipes => {
            let swipes = parse_lines(reader, ImportSwipe::into_record)?;
            let written = db.insert_swipes(&swipes)?;
            ImportSummary {
                read: swipes.len(),
                written,
            }
        }
        ImportKind::Employees => {
            let employees = parse_lines(reader, ImportEmployee::into_employee)?;
            let written = db.upsert_employees(&employees)?;
            ImportSummary {
                read: employees.len(),
                written,
            }
        }
    };
    tracing::debug!(?kind, read = summary.read, written = summary.written, "import finished");
    Ok(summary)
}

fn parse_lines<R, T, U>(reader: R, convert: fn(T) -> Result<U>) -> Result<Vec<U>>
where
    R: BufRead,
    T: DeserializeOwned,
{
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: T = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let record =
            convert(parsed).with_context(|| format!("invalid record on line {}", idx + 1))?;
        records.push(record);
    }
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ImportSwipe {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    timestamp: String,
    #[serde(default)]
    reader_name: Option<String>,
}

impl ImportSwipe {
    fn into_record(self) -> Result<SwipeRecord> {
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        // Stored in one canonical form so text comparison stays chronological.
        let timestamp = format_timestamp(parse_timestamp(&self.timestamp, &id)?);
        Ok(SwipeRecord {
            id,
            name: non_empty(self.name),
            last_name: non_empty(self.last_name),
            timestamp,
            reader_name: non_empty(self.reader_name),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ImportEmployee {
    id: i64,
    name: String,
    last_name: String,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl ImportEmployee {
    fn into_employee(self) -> Result<Employee> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("missing name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(anyhow!("missing last_name"));
        }
        Ok(Employee {
            id: self.id,
            name: self.name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            position: non_empty(self.position),
            email: non_empty(self.email),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
