//! Status command for showing what the local store holds.

use std::io::Write;

use anyhow::Result;

use att_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let employees = db.employee_count()?;
    let readers = db.last_swipe_times_by_reader()?;

    writeln!(writer, "Attendance tracker status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Employees: {employees}")?;

    if readers.is_empty() {
        writeln!(writer, "No swipes recorded.")?;
        return Ok(());
    }

    let classifier = config.classifier();
    writeln!(writer, "Readers:")?;
    for reader in readers {
        let direction = classifier
            .classify(&reader.reader_name)
            .map_or_else(|| "unclassified".to_string(), |d| d.to_string());
        writeln!(
            writer,
            "- {} ({direction}): {}",
            reader.reader_name, reader.last_swipe
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use att_core::Employee;
    use att_db::SwipeRecord;

    use insta::assert_snapshot;

    fn swipe(id: &str, timestamp: &str, reader: &str) -> SwipeRecord {
        SwipeRecord {
            id: id.to_string(),
            name: Some("Aysel".to_string()),
            last_name: Some("Guliyeva".to_string()),
            timestamp: timestamp.to_string(),
            reader_name: Some(reader.to_string()),
        }
    }

    #[test]
    fn status_command_outputs_last_swipe_per_reader() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("att.db");
        let mut db = Database::open(&db_path).unwrap();

        db.upsert_employees(&[Employee {
            id: 1,
            name: "Aysel".to_string(),
            last_name: "Guliyeva".to_string(),
            position: None,
            email: None,
        }])
        .unwrap();
        db.insert_swipes(&[
            swipe("a", "2025-01-06T08:58:00", "Gate-1"),
            swipe("b", "2025-01-06T17:32:00", "Gate-3"),
            swipe("c", "2025-01-06T12:00:00", "Lobby"),
        ])
        .unwrap();

        let config = Config {
            database_path: db_path.clone(),
            ..Config::default()
        };
        let mut output = Vec::new();
        run(&mut output, &db, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&db_path.display().to_string(), "[TEMP]/att.db");
        assert_snapshot!(output, @r"
        Attendance tracker status
        Database: [TEMP]/att.db
        Employees: 1
        Readers:
        - Gate-3 (out): 2025-01-06T17:32:00
        - Lobby (unclassified): 2025-01-06T12:00:00
        - Gate-1 (in): 2025-01-06T08:58:00
        ");
    }

    #[test]
    fn status_on_empty_database() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, &Config::default()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Employees: 0"));
        assert!(output.ends_with("No swipes recorded.\n"));
    }
}
