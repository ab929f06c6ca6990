use chrono::{Local, NaiveDate};

use crate::io::store::SessionStore;
use crate::model::session::{Session, SessionDraft};
use crate::ops::sequencer::SequenceError;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// An empty string clears a detail field; `None` leaves it alone.
fn merge_field(current: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        let value = value.trim();
        *current = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }
}

/// Create or update a session from a draft.
///
/// Without a number, a new active session is created with the next physical
/// number for the dog (dated today unless the draft says otherwise). With a
/// number, the existing session's date and details are updated; its status is
/// not touched.
pub fn save_session<S: SessionStore + ?Sized>(
    store: &mut S,
    dog: &str,
    draft: &SessionDraft,
) -> Result<Session, SequenceError> {
    let dog = dog.trim();
    if dog.is_empty() {
        return Err(SequenceError::NoDogSelected);
    }

    match draft.session_number {
        None => {
            let number = store.next_physical_session_number(dog)?;
            let mut session = Session::new(dog, number, draft.date.unwrap_or_else(today));
            merge_field(&mut session.handler, &draft.handler);
            merge_field(&mut session.location, &draft.location);
            merge_field(&mut session.notes, &draft.notes);
            store.insert_session(&session)?;
            tracing::info!(dog, session_number = number, date = %session.date, "session created");
            Ok(session)
        }
        Some(number) => {
            let mut session =
                store
                    .get_session(dog, number)?
                    .ok_or_else(|| SequenceError::SessionNotFound {
                        dog: dog.to_string(),
                        number,
                    })?;
            if let Some(date) = draft.date {
                session.date = date;
            }
            merge_field(&mut session.handler, &draft.handler);
            merge_field(&mut session.location, &draft.location);
            merge_field(&mut session.notes, &draft.notes);
            if !store.update_session(&session)? {
                return Err(SequenceError::SessionNotFound {
                    dog: dog.to_string(),
                    number,
                });
            }
            tracing::info!(dog, session_number = number, "session updated");
            Ok(session)
        }
    }
}

/// Permanently remove the dog's deleted sessions. Returns the purged numbers.
pub fn purge_deleted<S: SessionStore + ?Sized>(
    store: &mut S,
    dog: &str,
) -> Result<Vec<u32>, SequenceError> {
    let dog = dog.trim();
    if dog.is_empty() {
        return Err(SequenceError::NoDogSelected);
    }
    let purged = store.purge_deleted(dog)?;
    tracing::info!(dog, count = purged.len(), "purged deleted sessions");
    Ok(purged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory_store::MemoryStore;
    use crate::model::session::{SessionStatus, StatusFilter};
    use pretty_assertions::assert_eq;

    fn d(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    #[test]
    fn create_assigns_next_physical_number() {
        let mut store = MemoryStore::with_sessions([Session::new("Rex", 4, d(1))]);
        store.set_status("Rex", 4, SessionStatus::Deleted).unwrap();
        let draft = SessionDraft {
            date: Some(d(3)),
            handler: Some("Sam".into()),
            ..Default::default()
        };
        let created = save_session(&mut store, "Rex", &draft).unwrap();
        assert_eq!(created.session_number, 5);
        assert_eq!(created.status, Some(SessionStatus::Active));
        assert_eq!(created.handler.as_deref(), Some("Sam"));
        assert_eq!(store.count("Rex", StatusFilter::Active).unwrap(), 1);
    }

    #[test]
    fn create_defaults_to_today() {
        let mut store = MemoryStore::new();
        let created = save_session(&mut store, "Bella", &SessionDraft::default()).unwrap();
        assert_eq!(created.session_number, 1);
        assert_eq!(created.date, today());
    }

    #[test]
    fn update_merges_fields_and_keeps_status() {
        let mut original = Session::new("Rex", 1, d(1));
        original.location = Some("Park".into());
        original.notes = Some("windy".into());
        original.status = Some(SessionStatus::Deleted);
        let mut store = MemoryStore::with_sessions([original]);

        let draft = SessionDraft {
            session_number: Some(1),
            date: Some(d(2)),
            notes: Some("".into()),
            ..Default::default()
        };
        let updated = save_session(&mut store, "Rex", &draft).unwrap();
        assert_eq!(updated.date, d(2));
        assert_eq!(updated.location.as_deref(), Some("Park"));
        assert_eq!(updated.notes, None);
        assert_eq!(updated.status, Some(SessionStatus::Deleted));
        assert_eq!(store.get_session("Rex", 1).unwrap(), Some(updated));
    }

    #[test]
    fn update_of_missing_session_fails() {
        let mut store = MemoryStore::new();
        let draft = SessionDraft {
            session_number: Some(3),
            ..Default::default()
        };
        let err = save_session(&mut store, "Rex", &draft).unwrap_err();
        assert!(matches!(err, SequenceError::SessionNotFound { number: 3, .. }));
    }

    #[test]
    fn save_without_dog_fails() {
        let mut store = MemoryStore::new();
        let err = save_session(&mut store, "", &SessionDraft::default()).unwrap_err();
        assert!(matches!(err, SequenceError::NoDogSelected));
    }

    #[test]
    fn purge_returns_removed_numbers() {
        let mut store = MemoryStore::with_sessions([
            Session::new("Rex", 1, d(1)),
            Session::new("Rex", 2, d(2)),
        ]);
        store.set_status("Rex", 2, SessionStatus::Deleted).unwrap();
        assert_eq!(purge_deleted(&mut store, "Rex").unwrap(), vec![2]);
        assert_eq!(store.get_session("Rex", 2).unwrap(), None);
    }
}
