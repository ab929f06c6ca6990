use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

use super::store::{SessionStore, StoreError};
use crate::model::session::{Session, SessionKey, SessionStatus, StatusFilter};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
  dog_name TEXT NOT NULL,
  session_number INTEGER NOT NULL,
  date TEXT NOT NULL,
  handler TEXT,
  location TEXT,
  notes TEXT,
  status TEXT,
  PRIMARY KEY (dog_name, session_number)
);

CREATE INDEX IF NOT EXISTS sessions_by_date
  ON sessions (dog_name, date, session_number);
"#;

const SESSION_COLUMNS: &str =
    "dog_name, session_number, date, status, handler, location, notes";

/// Session store backed by a SQLite database file
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and bring its schema
    /// up to date.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        tracing::info!(path = %path.display(), "opened session database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = SqliteStore { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        // Databases created before soft-delete have no status column;
        // their rows read as active through the NULL rule.
        if !self.has_column("sessions", "status")? {
            tracing::info!("adding status column to legacy sessions table");
            self.conn
                .execute_batch("ALTER TABLE sessions ADD COLUMN status TEXT;")?;
        }
        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", table))?;
        let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
        for name in names {
            if name? == column {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Borrow the underlying connection (fixtures and one-off maintenance)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// SQL predicate for a status filter, appended after a `WHERE dog_name = ?1`
fn status_clause(filter: StatusFilter) -> &'static str {
    match filter {
        StatusFilter::Active => " AND (status = 'active' OR status IS NULL)",
        StatusFilter::Deleted => " AND status = 'deleted'",
        StatusFilter::Both => "",
    }
}

/// A row as stored, before date and status are validated
struct RawSession {
    dog_name: String,
    session_number: u32,
    date: String,
    status: Option<String>,
    handler: Option<String>,
    location: Option<String>,
    notes: Option<String>,
}

fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawSession> {
    Ok(RawSession {
        dog_name: row.get(0)?,
        session_number: row.get(1)?,
        date: row.get(2)?,
        status: row.get(3)?,
        handler: row.get(4)?,
        location: row.get(5)?,
        notes: row.get(6)?,
    })
}

fn parse_stored_date(dog: &str, number: u32, value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| StoreError::InvalidDate {
        dog: dog.to_string(),
        number,
        value: value.to_string(),
    })
}

impl RawSession {
    fn into_session(self) -> Result<Session, StoreError> {
        let date = parse_stored_date(&self.dog_name, self.session_number, &self.date)?;
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(s) => Some(SessionStatus::parse_status(s).ok_or_else(|| {
                StoreError::InvalidStatus {
                    dog: self.dog_name.clone(),
                    number: self.session_number,
                    value: s.to_string(),
                }
            })?),
        };
        Ok(Session {
            dog_name: self.dog_name,
            session_number: self.session_number,
            date,
            status,
            handler: self.handler,
            location: self.location,
            notes: self.notes,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl SessionStore for SqliteStore {
    fn list_sessions(&self, dog: &str, filter: StatusFilter) -> Result<Vec<SessionKey>, StoreError> {
        let sql = format!(
            "SELECT session_number, date FROM sessions WHERE dog_name = ?1{} \
             ORDER BY date ASC, session_number ASC",
            status_clause(filter)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![dog], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut keys = Vec::new();
        for row in rows {
            let (number, date) = row?;
            keys.push(SessionKey {
                session_number: number,
                date: parse_stored_date(dog, number, &date)?,
            });
        }
        Ok(keys)
    }

    fn get_session(&self, dog: &str, number: u32) -> Result<Option<Session>, StoreError> {
        let sql = format!(
            "SELECT {} FROM sessions WHERE dog_name = ?1 AND session_number = ?2",
            SESSION_COLUMNS
        );
        let raw = self
            .conn
            .query_row(&sql, params![dog, number], row_to_raw)
            .optional()?;
        raw.map(RawSession::into_session).transpose()
    }

    fn set_status(
        &mut self,
        dog: &str,
        number: u32,
        status: SessionStatus,
    ) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET status = ?3 WHERE dog_name = ?1 AND session_number = ?2",
            params![dog, number, status.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn next_physical_session_number(&self, dog: &str) -> Result<u32, StoreError> {
        let max: Option<u32> = self.conn.query_row(
            "SELECT MAX(session_number) FROM sessions WHERE dog_name = ?1",
            params![dog],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) + 1)
    }

    fn count(&self, dog: &str, filter: StatusFilter) -> Result<usize, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM sessions WHERE dog_name = ?1{}",
            status_clause(filter)
        );
        let n: i64 = self.conn.query_row(&sql, params![dog], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn count_on_or_before(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
    ) -> Result<usize, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM sessions WHERE dog_name = ?1{} AND date <= ?2",
            status_clause(filter)
        );
        let n: i64 = self
            .conn
            .query_row(&sql, params![dog, format_date(date)], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn count_before(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
        number: u32,
    ) -> Result<usize, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM sessions WHERE dog_name = ?1{} \
             AND (date < ?2 OR (date = ?2 AND session_number < ?3))",
            status_clause(filter)
        );
        let n: i64 = self.conn.query_row(
            &sql,
            params![dog, format_date(date), number],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    fn insert_session(&mut self, session: &Session) -> Result<(), StoreError> {
        let result = self.conn.execute(
            "INSERT INTO sessions (dog_name, session_number, date, status, handler, location, notes) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.dog_name,
                session.session_number,
                format_date(session.date),
                session.status.map(SessionStatus::as_str),
                session.handler,
                session.location,
                session.notes,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate {
                    dog: session.dog_name.clone(),
                    number: session.session_number,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_session(&mut self, session: &Session) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET date = ?3, handler = ?4, location = ?5, notes = ?6 \
             WHERE dog_name = ?1 AND session_number = ?2",
            params![
                session.dog_name,
                session.session_number,
                format_date(session.date),
                session.handler,
                session.location,
                session.notes,
            ],
        )?;
        Ok(changed > 0)
    }

    fn purge_deleted(&mut self, dog: &str) -> Result<Vec<u32>, StoreError> {
        let tx = self.conn.transaction()?;
        let doomed = {
            let mut stmt = tx.prepare(
                "SELECT session_number FROM sessions \
                 WHERE dog_name = ?1 AND status = 'deleted' ORDER BY session_number",
            )?;
            let rows = stmt.query_map(params![dog], |row| row.get::<_, u32>(0))?;
            rows.collect::<Result<Vec<u32>, _>>()?
        };
        tx.execute(
            "DELETE FROM sessions WHERE dog_name = ?1 AND status = 'deleted'",
            params![dog],
        )?;
        tx.commit()?;
        Ok(doomed)
    }

    fn dogs(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT dog_name FROM sessions ORDER BY dog_name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }
}
