use chrono::NaiveDate;

use crate::io::store::{SessionStore, StoreError};
use crate::model::config::OrdinalMode;
use crate::model::session::StatusFilter;

/// Count-based ordinal: matching sessions dated on or before `date`,
/// never less than 1. Sessions sharing a date share this ordinal.
pub fn count_ordinal<S: SessionStore + ?Sized>(
    store: &S,
    dog: &str,
    filter: StatusFilter,
    date: NaiveDate,
) -> Result<usize, StoreError> {
    Ok(store.count_on_or_before(dog, filter, date)?.max(1))
}

/// Strict rank: one more than the matching sessions ordered before
/// `(date, session_number)`. For a session in the filtered listing this is its
/// 1-based position; for one outside it, the position it would take.
pub fn rank_ordinal<S: SessionStore + ?Sized>(
    store: &S,
    dog: &str,
    filter: StatusFilter,
    date: NaiveDate,
    session_number: u32,
) -> Result<usize, StoreError> {
    Ok(store.count_before(dog, filter, date, session_number)? + 1)
}

/// The ordinal shown to the user for a session. The physical number is only
/// consulted as a tie-break in rank mode; it is never the result.
pub fn display_ordinal<S: SessionStore + ?Sized>(
    store: &S,
    mode: OrdinalMode,
    dog: &str,
    filter: StatusFilter,
    date: NaiveDate,
    session_number: u32,
) -> Result<usize, StoreError> {
    match mode {
        OrdinalMode::Count => count_ordinal(store, dog, filter, date),
        OrdinalMode::Rank => rank_ordinal(store, dog, filter, date, session_number),
    }
}

/// Ordinal a session created now would be shown with: `count(filtered) + 1`
pub fn next_new_ordinal<S: SessionStore + ?Sized>(
    store: &S,
    dog: &str,
    filter: StatusFilter,
) -> Result<usize, StoreError> {
    if dog.is_empty() {
        return Ok(1);
    }
    Ok(store.count(dog, filter)? + 1)
}
