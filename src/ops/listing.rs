use crate::io::store::{SessionStore, StoreError};
use crate::model::session::{SessionKey, StatusFilter};

/// One fetch of a dog's sessions under a filter, in `(date, session_number)` order.
///
/// A listing is a snapshot: it is fetched fresh for every decision and
/// dropped afterwards, never kept across events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    keys: Vec<SessionKey>,
}

/// Fetch the filtered, ordered sessions for `dog`. An empty dog name or an
/// unknown dog yields an empty listing.
pub fn list<S: SessionStore + ?Sized>(
    store: &S,
    dog: &str,
    filter: StatusFilter,
) -> Result<Listing, StoreError> {
    if dog.is_empty() {
        return Ok(Listing::default());
    }
    let keys = store.list_sessions(dog, filter)?;
    tracing::debug!(dog, %filter, len = keys.len(), "fetched session listing");
    Ok(Listing { keys })
}

impl Listing {
    pub fn from_keys(keys: Vec<SessionKey>) -> Self {
        Listing { keys }
    }

    pub fn keys(&self) -> &[SessionKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Physical numbers in list order
    pub fn numbers(&self) -> Vec<u32> {
        self.keys.iter().map(|k| k.session_number).collect()
    }

    /// Zero-based position of a physical number, if it is in this listing
    pub fn position_of(&self, session_number: u32) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| k.session_number == session_number)
    }

    pub fn contains(&self, session_number: u32) -> bool {
        self.position_of(session_number).is_some()
    }
}
