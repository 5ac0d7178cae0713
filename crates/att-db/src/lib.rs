//! Storage layer for attendance tracking.
//!
//! Provides persistence for employees, raw reader swipes and late-arrival
//! records using `rusqlite`, and the fetch step that turns stored swipes into
//! classified per-person swipes for `att-core`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Swipe timestamps are naive organization-local times stored as TEXT in the
//! form `2024-01-15T10:30:00` with an optional fractional part. No offset is
//! stored. Lexicographic ordering matches chronological ordering, so range
//! queries compare strings.
//!
//! ## Directions
//!
//! Swipes store the raw `reader_name`. Directions are not persisted: they are
//! derived at read time by a [`DirectionClassifier`], so changing the
//! classification rule never requires a migration.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use att_core::{
    DirectionClassifier, Employee, LateCheck, PersonKey, PersonSwipe, ReaderSwipe, fold_case,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored swipe timestamp.
    #[error("invalid timestamp for swipe {swipe_id}: {timestamp}")]
    TimestampParse {
        swipe_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A raw swipe as exported by the access-control system.
///
/// `timestamp` must already be in storage form (see [`format_timestamp`]);
/// range queries compare it as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeRecord {
    pub id: String,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub timestamp: String,
    pub reader_name: Option<String>,
}

/// Which employees to list.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter<'a> {
    /// Case-insensitive substring of first, last or full name.
    pub search: Option<&'a str>,
    /// Positions excluded from attendance, compared case-insensitively.
    pub excluded_positions: &'a [String],
}

/// A stored late arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LateArrivalRecord {
    pub employee_id: i64,
    pub late_date: String,
    pub expected_time: String,
    pub actual_time: String,
    pub late_minutes: i64,
}

/// Latest swipe timestamp grouped by reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderLastSwipe {
    pub reader_name: String,
    pub last_swipe: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                position TEXT,
                email TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_employees_name ON employees(last_name, name);

            -- Swipes table: raw reader events
            -- timestamp: naive local time (e.g., '2024-01-15T10:30:00')
            -- reader_name: classified into in/out at read time
            CREATE TABLE IF NOT EXISTS swipes (
                id TEXT PRIMARY KEY,
                name TEXT,
                last_name TEXT,
                timestamp TEXT NOT NULL,
                reader_name TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_swipes_timestamp ON swipes(timestamp);
            CREATE INDEX IF NOT EXISTS idx_swipes_person ON swipes(name, last_name);

            CREATE TABLE IF NOT EXISTS late_arrivals (
                employee_id INTEGER NOT NULL,
                late_date TEXT NOT NULL,
                expected_time TEXT NOT NULL,
                actual_time TEXT NOT NULL,
                late_minutes INTEGER NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (employee_id, late_date)
            );
            ",
        )?;
        Ok(())
    }

    /// Inserts or updates employees by ID.
    pub fn upsert_employees(&mut self, employees: &[Employee]) -> Result<usize, DbError> {
        if employees.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO employees (id, name, last_name, position, email)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    last_name = excluded.last_name,
                    position = excluded.position,
                    email = excluded.email
                ",
            )?;
            for employee in employees {
                written += stmt.execute(params![
                    employee.id,
                    employee.name,
                    employee.last_name,
                    employee.position,
                    employee.email,
                ])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Lists employees ordered by last name then first name.
    pub fn list_employees(&self, filter: &EmployeeFilter<'_>) -> Result<Vec<Employee>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, last_name, position, email
            FROM employees
            ORDER BY last_name ASC, name ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Employee {
                id: row.get(0)?,
                name: row.get(1)?,
                last_name: row.get(2)?,
                position: row.get(3)?,
                email: row.get(4)?,
            })
        })?;

        // SQLite's LOWER() only folds ASCII, so matching happens here.
        let excluded: Vec<String> = filter
            .excluded_positions
            .iter()
            .map(|p| fold_case(p.trim()))
            .collect();
        let search = filter
            .search
            .map(|s| fold_case(s.trim()))
            .filter(|s| !s.is_empty());

        let mut employees = Vec::new();
        for row in rows {
            let employee = row?;
            if employee
                .position
                .as_deref()
                .is_some_and(|p| excluded.contains(&fold_case(p.trim())))
            {
                continue;
            }
            if let Some(term) = &search {
                let matches = fold_case(&employee.name).contains(term)
                    || fold_case(&employee.last_name).contains(term)
                    || fold_case(&employee.full_name()).contains(term);
                if !matches {
                    continue;
                }
            }
            employees.push(employee);
        }
        Ok(employees)
    }

    /// Counts all stored employees.
    pub fn employee_count(&self) -> Result<i64, DbError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?)
    }

    /// Inserts a batch of swipes, ignoring duplicates by ID.
    pub fn insert_swipes(&mut self, swipes: &[SwipeRecord]) -> Result<usize, DbError> {
        if swipes.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO swipes (id, name, last_name, timestamp, reader_name)
                VALUES (?, ?, ?, ?, ?)
                ",
            )?;
            for swipe in swipes {
                inserted += stmt.execute(params![
                    swipe.id,
                    swipe.name,
                    swipe.last_name,
                    swipe.timestamp,
                    swipe.reader_name,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Lists swipes within a time range.
    ///
    /// The range is inclusive of both `start` and `end`.
    pub fn list_swipes_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<SwipeRecord>, DbError> {
        if end < start {
            return Ok(Vec::new());
        }
        let start = format_timestamp(start);
        let end = format_timestamp(end);
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, last_name, timestamp, reader_name
            FROM swipes
            WHERE timestamp >= ? AND timestamp <= ?
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([start, end], |row| {
            Ok(SwipeRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                last_name: row.get(2)?,
                timestamp: row.get(3)?,
                reader_name: row.get(4)?,
            })
        })?;
        let mut swipes = Vec::new();
        for row in rows {
            swipes.push(row?);
        }
        Ok(swipes)
    }

    /// Fetches swipes in a range and classifies their direction.
    ///
    /// Swipes without a first or last name, or whose reader the classifier
    /// does not recognize, are dropped.
    pub fn classified_swipes(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        classifier: &dyn DirectionClassifier,
    ) -> Result<Vec<PersonSwipe>, DbError> {
        Ok(self
            .classified_with_readers(start, end, classifier)?
            .into_iter()
            .map(|(swipe, _)| swipe)
            .collect())
    }

    /// One person's classified swipes on `date`, keeping reader names.
    pub fn reader_swipes_on(
        &self,
        date: NaiveDate,
        person: &PersonKey,
        classifier: &dyn DirectionClassifier,
    ) -> Result<Vec<ReaderSwipe>, DbError> {
        let (start, end) = day_range(date);
        Ok(self
            .classified_with_readers(start, end, classifier)?
            .into_iter()
            .filter(|(swipe, _)| swipe.person_key == *person)
            .map(|(swipe, reader_name)| ReaderSwipe {
                timestamp: swipe.timestamp,
                reader_name,
                direction: swipe.direction,
            })
            .collect())
    }

    fn classified_with_readers(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        classifier: &dyn DirectionClassifier,
    ) -> Result<Vec<(PersonSwipe, String)>, DbError> {
        let records = self.list_swipes_in_range(start, end)?;
        let total = records.len();
        let mut unnamed = 0;
        let mut unclassified = 0;
        let mut swipes = Vec::with_capacity(total);

        for record in records {
            let (Some(name), Some(last_name)) = (
                record.name.as_deref().filter(|n| !n.is_empty()),
                record.last_name.as_deref().filter(|n| !n.is_empty()),
            ) else {
                unnamed += 1;
                continue;
            };
            let Some((reader, direction)) = record
                .reader_name
                .as_deref()
                .and_then(|reader| Some((reader, classifier.classify(reader)?)))
            else {
                unclassified += 1;
                continue;
            };
            let timestamp = parse_timestamp(&record.timestamp, &record.id)?;
            swipes.push((
                PersonSwipe::new(name, last_name, timestamp, direction),
                reader.to_string(),
            ));
        }

        tracing::debug!(
            total,
            kept = swipes.len(),
            unnamed,
            unclassified,
            "classified swipes"
        );
        Ok(swipes)
    }

    /// Earliest entry swipe per person on `date`.
    pub fn first_entries(
        &self,
        date: NaiveDate,
        classifier: &dyn DirectionClassifier,
    ) -> Result<HashMap<PersonKey, NaiveDateTime>, DbError> {
        let (start, end) = day_range(date);
        let mut firsts: HashMap<PersonKey, NaiveDateTime> = HashMap::new();
        for swipe in self.classified_swipes(start, end, classifier)? {
            if !swipe.direction.is_in() {
                continue;
            }
            firsts
                .entry(swipe.person_key)
                .and_modify(|ts| *ts = (*ts).min(swipe.timestamp))
                .or_insert(swipe.timestamp);
        }
        Ok(firsts)
    }

    /// Records a late arrival, replacing any earlier record for the same day.
    pub fn save_late_arrival(
        &mut self,
        employee_id: i64,
        check: &LateCheck,
        updated_at: NaiveDateTime,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO late_arrivals
            (employee_id, late_date, expected_time, actual_time, late_minutes, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(employee_id, late_date) DO UPDATE SET
                actual_time = excluded.actual_time,
                late_minutes = excluded.late_minutes,
                updated_at = excluded.updated_at
            ",
            params![
                employee_id,
                check.date.format("%Y-%m-%d").to_string(),
                format_time(check.expected_time),
                format_time(check.actual_time),
                check.late_minutes,
                format_timestamp(updated_at),
            ],
        )?;
        Ok(())
    }

    /// Lists late arrivals recorded for `date`, ordered by employee.
    pub fn list_late_arrivals(&self, date: NaiveDate) -> Result<Vec<LateArrivalRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT employee_id, late_date, expected_time, actual_time, late_minutes
            FROM late_arrivals
            WHERE late_date = ?
            ORDER BY employee_id ASC
            ",
        )?;
        let rows = stmt.query_map([date.format("%Y-%m-%d").to_string()], |row| {
            Ok(LateArrivalRecord {
                employee_id: row.get(0)?,
                late_date: row.get(1)?,
                expected_time: row.get(2)?,
                actual_time: row.get(3)?,
                late_minutes: row.get(4)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Lists the last swipe timestamp per reader, ordered by most recent.
    pub fn last_swipe_times_by_reader(&self) -> Result<Vec<ReaderLastSwipe>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT reader_name, MAX(timestamp) AS last_swipe
            FROM swipes
            WHERE reader_name IS NOT NULL
            GROUP BY reader_name
            ORDER BY last_swipe DESC, reader_name ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ReaderLastSwipe {
                reader_name: row.get(0)?,
                last_swipe: row.get(1)?,
            })
        })?;
        let mut readers = Vec::new();
        for row in rows {
            readers.push(row?);
        }
        Ok(readers)
    }

    /// Looks up one employee by ID.
    pub fn get_employee(&self, id: i64) -> Result<Option<Employee>, DbError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, last_name, position, email FROM employees WHERE id = ?",
                [id],
                |row| {
                    Ok(Employee {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        last_name: row.get(2)?,
                        position: row.get(3)?,
                        email: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }
}

/// First and last representable instants of `date`.
pub fn day_range(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let end_of_day =
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    (date.and_time(NaiveTime::MIN), date.and_time(end_of_day))
}

/// Parses a swipe timestamp in `T`- or space-separated ISO form.
pub fn parse_timestamp(timestamp: &str, swipe_id: &str) -> Result<NaiveDateTime, DbError> {
    let trimmed = timestamp.trim();
    trimmed
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|source| DbError::TimestampParse {
            swipe_id: swipe_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

/// Formats a timestamp the way swipes are stored.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}
