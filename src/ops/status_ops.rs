use serde::Serialize;

use crate::io::store::SessionStore;
use crate::model::session::SessionStatus;
use crate::ops::sequencer::SequenceError;

/// What a single status change did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationOutcome {
    /// Status was written
    Changed,
    /// Session already had the requested status
    Unchanged,
    /// No session with that number for the dog; nothing happened
    NotFound,
}

/// Per-item results of a bulk status change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub changed: Vec<u32>,
    pub unchanged: Vec<u32>,
    pub not_found: Vec<u32>,
    /// Numbers whose write failed, with the store's message
    pub failed: Vec<(u32, String)>,
}

impl BulkReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Set one session's status, addressed by physical number.
pub fn set_session_status<S: SessionStore + ?Sized>(
    store: &mut S,
    dog: &str,
    session_number: u32,
    status: SessionStatus,
) -> Result<MutationOutcome, SequenceError> {
    if dog.trim().is_empty() {
        return Err(SequenceError::NoDogSelected);
    }
    let current = match store.get_status(dog, session_number)? {
        Some(current) => current,
        None => {
            tracing::debug!(dog, session_number, "status change skipped: no such session");
            return Ok(MutationOutcome::NotFound);
        }
    };
    if current == status {
        return Ok(MutationOutcome::Unchanged);
    }
    if !store.set_status(dog, session_number, status)? {
        // Removed by another process between the read and the write
        return Ok(MutationOutcome::NotFound);
    }
    tracing::info!(dog, session_number, %status, "session status changed");
    Ok(MutationOutcome::Changed)
}

/// Apply the same status to each number independently. A failed write is
/// recorded and the remaining numbers are still attempted.
pub fn set_status_many<S: SessionStore + ?Sized>(
    store: &mut S,
    dog: &str,
    numbers: &[u32],
    status: SessionStatus,
) -> Result<BulkReport, SequenceError> {
    if dog.trim().is_empty() {
        return Err(SequenceError::NoDogSelected);
    }
    let mut report = BulkReport::default();
    for &number in numbers {
        match set_session_status(store, dog, number, status) {
            Ok(MutationOutcome::Changed) => report.changed.push(number),
            Ok(MutationOutcome::Unchanged) => report.unchanged.push(number),
            Ok(MutationOutcome::NotFound) => report.not_found.push(number),
            Err(e) => {
                tracing::warn!(dog, number, error = %e, "bulk status change failed");
                report.failed.push((number, e.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory_store::{MemoryStore, ReadOnlyFor};
    use crate::model::session::Session;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn store() -> MemoryStore {
        let d = |n| NaiveDate::from_ymd_opt(2024, 1, n).unwrap();
        MemoryStore::with_sessions([
            Session::new("Rex", 1, d(1)),
            Session::new("Rex", 2, d(5)),
            Session::new("Rex", 3, d(10)),
        ])
    }

    #[test]
    fn delete_then_undelete() {
        let mut store = store();
        assert_eq!(
            set_session_status(&mut store, "Rex", 2, SessionStatus::Deleted).unwrap(),
            MutationOutcome::Changed
        );
        assert_eq!(
            store.get_status("Rex", 2).unwrap(),
            Some(SessionStatus::Deleted)
        );
        assert_eq!(
            set_session_status(&mut store, "Rex", 2, SessionStatus::Deleted).unwrap(),
            MutationOutcome::Unchanged
        );
        assert_eq!(
            set_session_status(&mut store, "Rex", 2, SessionStatus::Active).unwrap(),
            MutationOutcome::Changed
        );
    }

    #[test]
    fn missing_session_is_a_no_op() {
        let mut store = store();
        assert_eq!(
            set_session_status(&mut store, "Rex", 99, SessionStatus::Deleted).unwrap(),
            MutationOutcome::NotFound
        );
    }

    #[test]
    fn empty_dog_is_rejected() {
        let mut store = store();
        let err = set_session_status(&mut store, "  ", 1, SessionStatus::Deleted).unwrap_err();
        assert!(matches!(err, SequenceError::NoDogSelected));
    }

    #[test]
    fn bulk_reports_each_item() {
        let mut store = store();
        set_session_status(&mut store, "Rex", 3, SessionStatus::Deleted).unwrap();
        let report =
            set_status_many(&mut store, "Rex", &[1, 3, 42], SessionStatus::Deleted).unwrap();
        assert_eq!(report.changed, vec![1]);
        assert_eq!(report.unchanged, vec![3]);
        assert_eq!(report.not_found, vec![42]);
        assert!(report.is_clean());
    }

    #[test]
    fn failed_write_surfaces_as_persistence_error() {
        let mut store = ReadOnlyFor {
            inner: store(),
            numbers: vec![2],
        };
        let err = set_session_status(&mut store, "Rex", 2, SessionStatus::Deleted).unwrap_err();
        assert!(matches!(err, SequenceError::Persistence(_)));
        assert_eq!(
            store.get_status("Rex", 2).unwrap(),
            Some(SessionStatus::Active)
        );
    }

    #[test]
    fn bulk_continues_past_a_failed_write() {
        let mut store = ReadOnlyFor {
            inner: store(),
            numbers: vec![2],
        };
        let report =
            set_status_many(&mut store, "Rex", &[1, 2, 3], SessionStatus::Deleted).unwrap();
        assert_eq!(report.changed, vec![1, 3]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 2);
        assert!(report.failed[0].1.contains("readonly"));
        assert!(!report.is_clean());
    }
}
