use chrono::NaiveDate;

use crate::model::session::{Session, SessionKey, SessionStatus, StatusFilter};

/// Error type for session store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid date \"{value}\" stored for {dog} session {number}")]
    InvalidDate {
        dog: String,
        number: u32,
        value: String,
    },
    #[error("invalid status \"{value}\" stored for {dog} session {number}")]
    InvalidStatus {
        dog: String,
        number: u32,
        value: String,
    },
    #[error("session {number} already exists for {dog}")]
    Duplicate { dog: String, number: u32 },
}

/// Persistence for session records keyed by `(dog_name, session_number)`.
///
/// Every read goes to the backing store; implementations must not cache
/// listings, because another process may edit the same database between calls.
pub trait SessionStore {
    /// Sessions for `dog` matching `filter`, ordered by `(date, session_number)`.
    /// Unknown dogs yield an empty list.
    fn list_sessions(&self, dog: &str, filter: StatusFilter) -> Result<Vec<SessionKey>, StoreError>;

    fn get_session(&self, dog: &str, number: u32) -> Result<Option<Session>, StoreError>;

    /// `Ok(None)` when the session doesn't exist. A NULL status reads as active.
    fn get_status(&self, dog: &str, number: u32) -> Result<Option<SessionStatus>, StoreError> {
        Ok(self
            .get_session(dog, number)?
            .map(|s| s.effective_status()))
    }

    /// Returns false when no such session exists
    fn set_status(&mut self, dog: &str, number: u32, status: SessionStatus)
    -> Result<bool, StoreError>;

    /// `max(existing) + 1` across every status, or 1 for a new dog
    fn next_physical_session_number(&self, dog: &str) -> Result<u32, StoreError>;

    fn count(&self, dog: &str, filter: StatusFilter) -> Result<usize, StoreError>;

    /// Matching sessions dated on or before `date`
    fn count_on_or_before(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
    ) -> Result<usize, StoreError>;

    /// Matching sessions strictly before `(date, number)` in list order
    fn count_before(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
        number: u32,
    ) -> Result<usize, StoreError>;

    fn insert_session(&mut self, session: &Session) -> Result<(), StoreError>;

    /// Overwrite date and detail fields; status is left alone.
    /// Returns false when no such session exists.
    fn update_session(&mut self, session: &Session) -> Result<bool, StoreError>;

    /// Permanently remove the dog's deleted sessions, returning their numbers
    fn purge_deleted(&mut self, dog: &str) -> Result<Vec<u32>, StoreError>;

    /// Distinct dog names, sorted
    fn dogs(&self) -> Result<Vec<String>, StoreError>;
}
