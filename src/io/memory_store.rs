use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::store::{SessionStore, StoreError};
use crate::model::session::{Session, SessionKey, SessionStatus, StatusFilter};

/// A session store held entirely in memory.
///
/// Used for detached work and tests; it answers every query the same way the
/// SQLite store does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: BTreeMap<(String, u32), Session>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing records, replacing duplicates by key
    pub fn with_sessions(sessions: impl IntoIterator<Item = Session>) -> Self {
        let mut store = Self::new();
        for session in sessions {
            store
                .sessions
                .insert((session.dog_name.clone(), session.session_number), session);
        }
        store
    }

    fn matching<'a>(
        &'a self,
        dog: &'a str,
        filter: StatusFilter,
    ) -> impl Iterator<Item = &'a Session> + 'a {
        self.sessions
            .values()
            .filter(move |s| s.dog_name == dog && filter.matches(s.status))
    }
}

impl SessionStore for MemoryStore {
    fn list_sessions(&self, dog: &str, filter: StatusFilter) -> Result<Vec<SessionKey>, StoreError> {
        let mut keys: Vec<SessionKey> = self.matching(dog, filter).map(Session::key).collect();
        keys.sort_by_key(|k| (k.date, k.session_number));
        Ok(keys)
    }

    fn get_session(&self, dog: &str, number: u32) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(&(dog.to_string(), number)).cloned())
    }

    fn set_status(
        &mut self,
        dog: &str,
        number: u32,
        status: SessionStatus,
    ) -> Result<bool, StoreError> {
        match self.sessions.get_mut(&(dog.to_string(), number)) {
            Some(session) => {
                session.status = Some(status);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn next_physical_session_number(&self, dog: &str) -> Result<u32, StoreError> {
        let max = self
            .sessions
            .values()
            .filter(|s| s.dog_name == dog)
            .map(|s| s.session_number)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    fn count(&self, dog: &str, filter: StatusFilter) -> Result<usize, StoreError> {
        Ok(self.matching(dog, filter).count())
    }

    fn count_on_or_before(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
    ) -> Result<usize, StoreError> {
        Ok(self.matching(dog, filter).filter(|s| s.date <= date).count())
    }

    fn count_before(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
        number: u32,
    ) -> Result<usize, StoreError> {
        Ok(self
            .matching(dog, filter)
            .filter(|s| (s.date, s.session_number) < (date, number))
            .count())
    }

    fn insert_session(&mut self, session: &Session) -> Result<(), StoreError> {
        let key = (session.dog_name.clone(), session.session_number);
        if self.sessions.contains_key(&key) {
            return Err(StoreError::Duplicate {
                dog: session.dog_name.clone(),
                number: session.session_number,
            });
        }
        self.sessions.insert(key, session.clone());
        Ok(())
    }

    fn update_session(&mut self, session: &Session) -> Result<bool, StoreError> {
        match self
            .sessions
            .get_mut(&(session.dog_name.clone(), session.session_number))
        {
            Some(existing) => {
                existing.date = session.date;
                existing.handler = session.handler.clone();
                existing.location = session.location.clone();
                existing.notes = session.notes.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn purge_deleted(&mut self, dog: &str) -> Result<Vec<u32>, StoreError> {
        let doomed: Vec<u32> = self
            .matching(dog, StatusFilter::Deleted)
            .map(|s| s.session_number)
            .collect();
        for number in &doomed {
            self.sessions.remove(&(dog.to_string(), *number));
        }
        Ok(doomed)
    }

    fn dogs(&self) -> Result<Vec<String>, StoreError> {
        let mut dogs: Vec<String> = self.sessions.keys().map(|(dog, _)| dog.clone()).collect();
        dogs.dedup();
        Ok(dogs)
    }
}

/// A memory store whose status writes fail for chosen session numbers, the
/// way a read-only or locked database would.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ReadOnlyFor {
    pub inner: MemoryStore,
    pub numbers: Vec<u32>,
}

#[cfg(test)]
impl ReadOnlyFor {
    fn refused() -> StoreError {
        StoreError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_READONLY),
            Some("attempt to write a readonly database".to_string()),
        ))
    }
}

#[cfg(test)]
impl SessionStore for ReadOnlyFor {
    fn list_sessions(&self, dog: &str, filter: StatusFilter) -> Result<Vec<SessionKey>, StoreError> {
        self.inner.list_sessions(dog, filter)
    }

    fn get_session(&self, dog: &str, number: u32) -> Result<Option<Session>, StoreError> {
        self.inner.get_session(dog, number)
    }

    fn set_status(
        &mut self,
        dog: &str,
        number: u32,
        status: SessionStatus,
    ) -> Result<bool, StoreError> {
        if self.numbers.contains(&number) {
            return Err(Self::refused());
        }
        self.inner.set_status(dog, number, status)
    }

    fn next_physical_session_number(&self, dog: &str) -> Result<u32, StoreError> {
        self.inner.next_physical_session_number(dog)
    }

    fn count(&self, dog: &str, filter: StatusFilter) -> Result<usize, StoreError> {
        self.inner.count(dog, filter)
    }

    fn count_on_or_before(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
    ) -> Result<usize, StoreError> {
        self.inner.count_on_or_before(dog, filter, date)
    }

    fn count_before(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
        number: u32,
    ) -> Result<usize, StoreError> {
        self.inner.count_before(dog, filter, date, number)
    }

    fn insert_session(&mut self, session: &Session) -> Result<(), StoreError> {
        self.inner.insert_session(session)
    }

    fn update_session(&mut self, session: &Session) -> Result<bool, StoreError> {
        self.inner.update_session(session)
    }

    fn purge_deleted(&mut self, dog: &str) -> Result<Vec<u32>, StoreError> {
        self.inner.purge_deleted(dog)
    }

    fn dogs(&self) -> Result<Vec<String>, StoreError> {
        self.inner.dogs()
    }
}
