use chrono::NaiveDate;
use serde::Serialize;

use crate::io::state::SequencerState;
use crate::io::store::{SessionStore, StoreError};
use crate::model::config::OrdinalMode;
use crate::model::session::{Session, SessionDraft, SessionStatus, StatusFilter};
use crate::ops::cursor::{self, Cursor, CursorEvent, CursorMode, Direction};
use crate::ops::listing::{self, Listing};
use crate::ops::ordinal;
use crate::ops::session_ops;
use crate::ops::status_ops::{self, BulkReport, MutationOutcome};

/// Error type for sequencer operations
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("no dog selected")]
    NoDogSelected,
    #[error("session {number} not found for {dog}")]
    SessionNotFound { dog: String, number: u32 },
    #[error("session store failed: {0}")]
    Persistence(#[from] StoreError),
}

/// What the form should show after an event.
///
/// `session.session_number` is the physical key (for Delete/Undelete and
/// saving); `ordinal` is the filter-dependent label. They are never swapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub dog: Option<String>,
    pub filter: StatusFilter,
    pub mode: CursorMode,
    /// `None` means the form presents a new, unsaved session
    pub session: Option<Session>,
    /// Displayed ordinal of the loaded session, or of the next new one
    pub ordinal: usize,
    /// Sessions in the current filter
    pub total: usize,
    /// `(position, len)` while walking a picked subset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explicit_position: Option<(usize, usize)>,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub can_delete: bool,
    pub can_undelete: bool,
    /// The loaded session doesn't pass the current filter
    pub stale_membership: bool,
}

/// Orders, numbers, and navigates one dog's sessions over a session store.
///
/// Nothing fetched from the store outlives the call that fetched it; every
/// view and navigation decision re-queries.
#[derive(Debug)]
pub struct Sequencer<S: SessionStore> {
    store: S,
    ordinal_mode: OrdinalMode,
    dog: Option<String>,
    filter: StatusFilter,
    cursor: Cursor,
}

impl<S: SessionStore> Sequencer<S> {
    pub fn new(store: S, ordinal_mode: OrdinalMode, filter: StatusFilter) -> Self {
        Sequencer {
            store,
            ordinal_mode,
            dog: None,
            filter,
            cursor: Cursor::Unset,
        }
    }

    /// Resume from persisted state
    pub fn from_state(store: S, ordinal_mode: OrdinalMode, state: SequencerState) -> Self {
        let mut sequencer = Sequencer::new(store, ordinal_mode, state.filter);
        sequencer.dog = state.dog.filter(|d| !d.trim().is_empty());
        sequencer.cursor = state.cursor;
        sequencer
    }

    /// State to persist between invocations
    pub fn state(&self) -> SequencerState {
        SequencerState {
            dog: self.dog.clone(),
            filter: self.filter,
            cursor: self.cursor.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn dog(&self) -> Option<&str> {
        self.dog.as_deref()
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn ordinal_mode(&self) -> OrdinalMode {
        self.ordinal_mode
    }

    fn require_dog(&self) -> Result<String, SequenceError> {
        self.dog.clone().ok_or(SequenceError::NoDogSelected)
    }

    fn set_cursor(&mut self, next: Cursor) {
        if next != self.cursor {
            tracing::debug!(from = ?self.cursor.mode(), to = ?next.mode(), "cursor moved");
        }
        self.cursor = next;
    }

    // -----------------------------------------------------------------------
    // Presentation
    // -----------------------------------------------------------------------

    /// Build the view for the current state from fresh store reads.
    pub fn view(&self) -> Result<SessionView, SequenceError> {
        let loaded = match self.cursor.current() {
            Some((dog, number)) => self
                .store
                .get_session(dog, number)?
                .map(|session| (dog.to_string(), session)),
            None => None,
        };

        let (dog, session) = match loaded {
            Some((dog, session)) => (Some(dog), Some(session)),
            None => (self.dog.clone(), None),
        };

        let listing = match dog.as_deref() {
            Some(dog) => listing::list(&self.store, dog, self.filter)?,
            None => Listing::default(),
        };

        let Some(session) = session else {
            let ordinal = match dog.as_deref() {
                Some(dog) => ordinal::next_new_ordinal(&self.store, dog, self.filter)?,
                None => 1,
            };
            return Ok(SessionView {
                dog,
                filter: self.filter,
                mode: CursorMode::Unset,
                session: None,
                ordinal,
                total: listing.len(),
                explicit_position: None,
                can_go_previous: false,
                can_go_next: false,
                can_delete: false,
                can_undelete: false,
                stale_membership: false,
            });
        };

        let ordinal = ordinal::display_ordinal(
            &self.store,
            self.ordinal_mode,
            &session.dog_name,
            self.filter,
            session.date,
            session.session_number,
        )?;
        let stale_membership = !listing.contains(session.session_number);
        if stale_membership {
            tracing::debug!(
                dog = %session.dog_name,
                session_number = session.session_number,
                filter = %self.filter,
                "loaded session is outside the current filter"
            );
        }
        let status = session.effective_status();

        Ok(SessionView {
            dog,
            filter: self.filter,
            mode: self.cursor.mode(),
            ordinal,
            total: listing.len(),
            explicit_position: self.cursor.explicit_position(),
            can_go_previous: cursor::can_step(&self.cursor, Direction::Previous, &listing),
            can_go_next: cursor::can_step(&self.cursor, Direction::Next, &listing),
            can_delete: status == SessionStatus::Active,
            can_undelete: status == SessionStatus::Deleted,
            stale_membership,
            session: Some(session),
        })
    }

    /// Re-read the displayed session. If it no longer exists the form falls
    /// back to a new session.
    pub fn reload(&mut self) -> Result<SessionView, SequenceError> {
        if let Some((dog, number)) = self.cursor.current() {
            if self.store.get_session(dog, number)?.is_none() {
                tracing::debug!(dog, session_number = number, "displayed session is gone");
                let next = cursor::transition(&self.cursor, CursorEvent::Missing);
                self.set_cursor(next);
            }
        }
        self.view()
    }

    /// Load a session by physical number and make it the implicit cursor
    /// (or keep the subset when it is the subset's current element).
    fn load(&mut self, dog: &str, number: u32) -> Result<SessionView, SequenceError> {
        let event = match self.store.get_session(dog, number)? {
            Some(_) => CursorEvent::Load {
                dog,
                filter: self.filter,
                session_number: number,
            },
            None => CursorEvent::Missing,
        };
        let next = cursor::transition(&self.cursor, event);
        if self.dog.as_deref() != Some(dog) {
            self.dog = Some(dog.to_string());
        }
        self.set_cursor(next);
        self.view()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Switch to another dog. The form resets to a new session.
    pub fn select_dog(&mut self, dog: &str) -> Result<SessionView, SequenceError> {
        let dog = dog.trim();
        let next_dog = if dog.is_empty() {
            None
        } else {
            Some(dog.to_string())
        };
        if next_dog != self.dog {
            self.dog = next_dog;
            let next = cursor::transition(&self.cursor, CursorEvent::DogChanged);
            self.set_cursor(next);
        }
        self.view()
    }

    /// The "New" button
    pub fn new_session(&mut self) -> Result<SessionView, SequenceError> {
        let next = cursor::transition(&self.cursor, CursorEvent::New);
        self.set_cursor(next);
        self.view()
    }

    /// A session number typed into the form. An unknown number presents a
    /// new session rather than failing.
    pub fn open(&mut self, session_number: u32) -> Result<SessionView, SequenceError> {
        let dog = self.require_dog()?;
        self.load(&dog, session_number)
    }

    /// Filter-Change Reactor: re-rank the displayed session under the new
    /// filter, or refresh the next-new ordinal when nothing is loaded.
    pub fn on_filter_changed(&mut self, filter: StatusFilter) -> Result<SessionView, SequenceError> {
        tracing::debug!(from = %self.filter, to = %filter, "status filter changed");
        self.filter = filter;
        let next = cursor::transition(&self.cursor, CursorEvent::FilterChanged(filter));
        self.set_cursor(next);
        self.reload()
    }

    pub fn on_next(&mut self) -> Result<SessionView, SequenceError> {
        self.step(Direction::Next)
    }

    pub fn on_previous(&mut self) -> Result<SessionView, SequenceError> {
        self.step(Direction::Previous)
    }

    fn step(&mut self, direction: Direction) -> Result<SessionView, SequenceError> {
        if self.cursor == Cursor::Unset && self.dog.is_none() {
            return Err(SequenceError::NoDogSelected);
        }
        let listing = match &self.cursor {
            Cursor::Implicit { dog, .. } => listing::list(&self.store, dog, self.filter)?,
            _ => Listing::default(),
        };
        let next = cursor::transition(
            &self.cursor,
            CursorEvent::Step {
                direction,
                listing: &listing,
            },
        );
        self.set_cursor(next);
        self.reload()
    }

    /// The picker returned a subset: walk it in pick order. Numbers with no
    /// session are dropped.
    pub fn on_select_subset(&mut self, numbers: &[u32]) -> Result<SessionView, SequenceError> {
        let dog = self.require_dog()?;
        let mut existing = Vec::with_capacity(numbers.len());
        for &number in numbers {
            if self.store.get_session(&dog, number)?.is_some() {
                existing.push(number);
            } else {
                tracing::debug!(dog = %dog, session_number = number, "dropping unknown pick");
            }
        }
        let next = cursor::transition(
            &self.cursor,
            CursorEvent::SelectSubset {
                dog: &dog,
                selection: &existing,
            },
        );
        self.set_cursor(next);
        self.view()
    }

    /// Soft-delete one session, then reload it so its ordinal and the
    /// buttons reflect its new filter membership.
    pub fn mark_deleted(
        &mut self,
        dog: &str,
        session_number: u32,
    ) -> Result<(MutationOutcome, SessionView), SequenceError> {
        self.mark(dog, session_number, SessionStatus::Deleted)
    }

    pub fn mark_active(
        &mut self,
        dog: &str,
        session_number: u32,
    ) -> Result<(MutationOutcome, SessionView), SequenceError> {
        self.mark(dog, session_number, SessionStatus::Active)
    }

    fn mark(
        &mut self,
        dog: &str,
        session_number: u32,
        status: SessionStatus,
    ) -> Result<(MutationOutcome, SessionView), SequenceError> {
        let dog = dog.trim();
        let outcome = status_ops::set_session_status(&mut self.store, dog, session_number, status)?;
        let view = match outcome {
            MutationOutcome::NotFound => self.view()?,
            MutationOutcome::Changed | MutationOutcome::Unchanged => {
                self.load(dog, session_number)?
            }
        };
        Ok((outcome, view))
    }

    /// Bulk soft-delete from the picker. A clean run resets the form to a new
    /// session; if any write failed the cursor is left as it was.
    pub fn mark_deleted_many(
        &mut self,
        numbers: &[u32],
    ) -> Result<(BulkReport, SessionView), SequenceError> {
        self.mark_many(numbers, SessionStatus::Deleted)
    }

    pub fn mark_active_many(
        &mut self,
        numbers: &[u32],
    ) -> Result<(BulkReport, SessionView), SequenceError> {
        self.mark_many(numbers, SessionStatus::Active)
    }

    fn mark_many(
        &mut self,
        numbers: &[u32],
        status: SessionStatus,
    ) -> Result<(BulkReport, SessionView), SequenceError> {
        let dog = self.require_dog()?;
        let report = status_ops::set_status_many(&mut self.store, &dog, numbers, status)?;
        let view = if report.is_clean() {
            self.new_session()?
        } else {
            self.view()?
        };
        Ok((report, view))
    }

    /// Save the form. The saved session becomes the displayed one.
    pub fn save(&mut self, draft: &SessionDraft) -> Result<(Session, SessionView), SequenceError> {
        let dog = self.require_dog()?;
        let session = session_ops::save_session(&mut self.store, &dog, draft)?;
        let view = self.load(&session.dog_name, session.session_number)?;
        Ok((session, view))
    }

    /// Permanently remove a dog's deleted sessions. If the form was showing
    /// one of them it resets to a new session.
    pub fn purge_deleted(&mut self, dog: &str) -> Result<(Vec<u32>, SessionView), SequenceError> {
        let purged = session_ops::purge_deleted(&mut self.store, dog)?;
        let touches_cursor = match &self.cursor {
            Cursor::Unset => false,
            Cursor::Implicit {
                dog: cursor_dog,
                session_number,
                ..
            } => cursor_dog == dog.trim() && purged.contains(session_number),
            Cursor::Explicit {
                dog: cursor_dog,
                selection,
                ..
            } => cursor_dog == dog.trim() && selection.iter().any(|n| purged.contains(n)),
        };
        let view = if touches_cursor {
            self.new_session()?
        } else {
            self.view()?
        };
        Ok((purged, view))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Ordinal label for a session under any dog and filter
    pub fn display_ordinal(
        &self,
        dog: &str,
        filter: StatusFilter,
        date: NaiveDate,
        session_number: u32,
    ) -> Result<usize, SequenceError> {
        Ok(ordinal::display_ordinal(
            &self.store,
            self.ordinal_mode,
            dog,
            filter,
            date,
            session_number,
        )?)
    }

    /// Ordered sessions with their displayed ordinals, for the picker and
    /// listings. Ordinals here are list positions in rank mode.
    pub fn numbered_sessions(
        &self,
        dog: &str,
        filter: StatusFilter,
    ) -> Result<Vec<(usize, Session)>, SequenceError> {
        let listing = listing::list(&self.store, dog, filter)?;
        let mut rows = Vec::with_capacity(listing.len());
        for key in listing.keys() {
            let Some(session) = self.store.get_session(dog, key.session_number)? else {
                continue;
            };
            let ordinal = self.display_ordinal(dog, filter, key.date, key.session_number)?;
            rows.push((ordinal, session));
        }
        Ok(rows)
    }

    pub fn dogs(&self) -> Result<Vec<String>, SequenceError> {
        Ok(self.store.dogs()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory_store::{MemoryStore, ReadOnlyFor};
    use pretty_assertions::assert_eq;

    fn d(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    fn rex() -> Sequencer<MemoryStore> {
        let store = MemoryStore::with_sessions([
            Session::new("Rex", 1, d(1)),
            Session::new("Rex", 2, d(5)),
            Session::new("Rex", 3, d(10)),
        ]);
        let mut seq = Sequencer::new(store, OrdinalMode::Rank, StatusFilter::Active);
        seq.select_dog("Rex").unwrap();
        seq
    }

    fn number(view: &SessionView) -> Option<u32> {
        view.session.as_ref().map(|s| s.session_number)
    }

    #[test]
    fn unset_view_shows_next_new_ordinal() {
        let seq = rex();
        let view = seq.view().unwrap();
        assert_eq!(view.mode, CursorMode::Unset);
        assert_eq!(view.session, None);
        assert_eq!(view.ordinal, 4);
        assert_eq!(view.total, 3);
        assert!(!view.can_go_next && !view.can_go_previous);
        assert!(!view.can_delete && !view.can_undelete);
    }

    #[test]
    fn open_unknown_number_presents_new_session() {
        let mut seq = rex();
        seq.open(2).unwrap();
        let view = seq.open(77).unwrap();
        assert_eq!(view.session, None);
        assert_eq!(seq.cursor(), &Cursor::Unset);
    }

    #[test]
    fn open_without_dog_is_rejected() {
        let mut seq = Sequencer::new(MemoryStore::new(), OrdinalMode::Rank, StatusFilter::Active);
        assert!(matches!(seq.open(1), Err(SequenceError::NoDogSelected)));
        assert!(matches!(seq.on_next(), Err(SequenceError::NoDogSelected)));
        assert_eq!(seq.cursor(), &Cursor::Unset);
    }

    #[test]
    fn implicit_navigation_walks_filtered_list() {
        let mut seq = rex();
        let view = seq.open(1).unwrap();
        assert!(!view.can_go_previous);
        assert!(view.can_go_next);
        let view = seq.on_next().unwrap();
        assert_eq!(number(&view), Some(2));
        assert_eq!(view.ordinal, 2);
        let view = seq.on_next().unwrap();
        assert_eq!(number(&view), Some(3));
        assert!(!view.can_go_next);
        let view = seq.on_next().unwrap();
        assert_eq!(number(&view), Some(3));
    }

    #[test]
    fn deleting_under_active_filter_marks_view_stale() {
        let mut seq = rex();
        seq.open(2).unwrap();
        let (outcome, view) = seq.mark_deleted("Rex", 2).unwrap();
        assert_eq!(outcome, MutationOutcome::Changed);
        assert_eq!(number(&view), Some(2));
        assert!(view.stale_membership);
        assert!(!view.can_go_previous && !view.can_go_next);
        assert!(!view.can_delete);
        assert!(view.can_undelete);
        assert_eq!(view.total, 2);
    }

    #[test]
    fn filter_change_rerank_after_delete() {
        let mut seq = rex();
        seq.open(2).unwrap();
        seq.mark_deleted("Rex", 2).unwrap();
        let view = seq.on_filter_changed(StatusFilter::Deleted).unwrap();
        assert_eq!(number(&view), Some(2));
        assert_eq!(view.ordinal, 1);
        assert!(!view.stale_membership);
        assert_eq!(view.total, 1);
        let view = seq.on_filter_changed(StatusFilter::Both).unwrap();
        assert_eq!(view.ordinal, 2);
        assert!(view.can_go_previous && view.can_go_next);
    }

    #[test]
    fn filter_change_while_unset_refreshes_new_ordinal() {
        let mut seq = rex();
        seq.store_mut()
            .set_status("Rex", 1, SessionStatus::Deleted)
            .unwrap();
        let view = seq.on_filter_changed(StatusFilter::Deleted).unwrap();
        assert_eq!(view.session, None);
        assert_eq!(view.ordinal, 2);
    }

    #[test]
    fn undelete_restores_membership() {
        let mut seq = rex();
        seq.mark_deleted("Rex", 3).unwrap();
        let (_, view) = seq.mark_active("Rex", 3).unwrap();
        assert!(!view.stale_membership);
        assert_eq!(view.ordinal, 3);
        assert!(view.can_delete);
    }

    #[test]
    fn mark_missing_session_is_a_no_op() {
        let mut seq = rex();
        seq.open(1).unwrap();
        let (outcome, view) = seq.mark_deleted("Rex", 40).unwrap();
        assert_eq!(outcome, MutationOutcome::NotFound);
        assert_eq!(number(&view), Some(1));
    }

    #[test]
    fn mark_without_dog_leaves_state() {
        let mut seq = rex();
        seq.open(1).unwrap();
        let before = seq.state();
        assert!(matches!(
            seq.mark_deleted("", 1),
            Err(SequenceError::NoDogSelected)
        ));
        assert_eq!(seq.state(), before);
    }

    #[test]
    fn explicit_subset_navigation() {
        let store = MemoryStore::with_sessions(
            (1..=9).map(|n| Session::new("Rex", n, d(n))),
        );
        let mut seq = Sequencer::new(store, OrdinalMode::Rank, StatusFilter::Active);
        seq.select_dog("Rex").unwrap();
        let view = seq.on_select_subset(&[5, 2, 9]).unwrap();
        assert_eq!(number(&view), Some(5));
        assert_eq!(view.mode, CursorMode::Explicit);
        assert!(!view.can_go_previous);
        seq.on_next().unwrap();
        let view = seq.on_next().unwrap();
        assert_eq!(number(&view), Some(9));
        assert!(!view.can_go_next);
        let view = seq.on_previous().unwrap();
        assert_eq!(number(&view), Some(2));
        assert!(view.can_go_next);
        assert_eq!(view.explicit_position, Some((2, 3)));
        // Ordinal is still the filtered rank, not the pick position
        assert_eq!(view.ordinal, 2);
    }

    #[test]
    fn explicit_mode_cleared_by_new_dog_and_typed_number() {
        let mut seq = rex();
        seq.on_select_subset(&[3, 1]).unwrap();
        assert_eq!(seq.open(3).unwrap().mode, CursorMode::Explicit);
        assert_eq!(seq.open(2).unwrap().mode, CursorMode::Implicit);

        seq.on_select_subset(&[3, 1]).unwrap();
        assert_eq!(seq.new_session().unwrap().mode, CursorMode::Unset);

        seq.on_select_subset(&[3, 1]).unwrap();
        assert_eq!(seq.select_dog("Bella").unwrap().mode, CursorMode::Unset);
    }

    #[test]
    fn subset_drops_unknown_numbers() {
        let mut seq = rex();
        let view = seq.on_select_subset(&[40, 2]).unwrap();
        assert_eq!(number(&view), Some(2));
        assert_eq!(view.explicit_position, Some((1, 1)));
    }

    #[test]
    fn bulk_delete_resets_cursor() {
        let mut seq = rex();
        seq.on_select_subset(&[1, 3]).unwrap();
        let (report, view) = seq.mark_deleted_many(&[1, 3]).unwrap();
        assert_eq!(report.changed, vec![1, 3]);
        assert_eq!(view.mode, CursorMode::Unset);
        assert_eq!(view.total, 1);
        assert_eq!(view.ordinal, 2);
    }

    #[test]
    fn save_creates_and_loads() {
        let mut seq = rex();
        seq.mark_deleted("Rex", 3).unwrap();
        let draft = SessionDraft {
            date: Some(d(20)),
            ..Default::default()
        };
        let (session, view) = seq.save(&draft).unwrap();
        assert_eq!(session.session_number, 4);
        assert_eq!(view.ordinal, 3);
        assert_eq!(view.mode, CursorMode::Implicit);
        assert!(view.can_go_previous);
    }

    #[test]
    fn reload_after_external_removal_falls_back_to_new() {
        let mut seq = rex();
        seq.open(2).unwrap();
        seq.store_mut()
            .set_status("Rex", 2, SessionStatus::Deleted)
            .unwrap();
        seq.store_mut().purge_deleted("Rex").unwrap();
        let view = seq.reload().unwrap();
        assert_eq!(view.session, None);
        assert_eq!(seq.cursor(), &Cursor::Unset);
    }

    #[test]
    fn purge_of_displayed_session_resets() {
        let mut seq = rex();
        seq.open(2).unwrap();
        seq.mark_deleted("Rex", 2).unwrap();
        let (purged, view) = seq.purge_deleted("Rex").unwrap();
        assert_eq!(purged, vec![2]);
        assert_eq!(view.mode, CursorMode::Unset);
        assert_eq!(view.ordinal, 3);
    }

    #[test]
    fn state_round_trips_through_from_state() {
        let mut seq = rex();
        seq.on_filter_changed(StatusFilter::Both).unwrap();
        seq.open(3).unwrap();
        let state = seq.state();
        let resumed = Sequencer::from_state(seq.into_store(), OrdinalMode::Rank, state.clone());
        assert_eq!(resumed.state(), state);
        assert_eq!(number(&resumed.view().unwrap()), Some(3));
    }

    fn rex_read_only_for(numbers: Vec<u32>) -> Sequencer<ReadOnlyFor> {
        let store = ReadOnlyFor {
            inner: MemoryStore::with_sessions([
                Session::new("Rex", 1, d(1)),
                Session::new("Rex", 2, d(5)),
                Session::new("Rex", 3, d(10)),
            ]),
            numbers,
        };
        let mut seq = Sequencer::new(store, OrdinalMode::Rank, StatusFilter::Active);
        seq.select_dog("Rex").unwrap();
        seq
    }

    #[test]
    fn failed_mark_leaves_cursor_and_state() {
        let mut seq = rex_read_only_for(vec![2]);
        seq.open(3).unwrap();
        let before = seq.state();
        assert!(matches!(
            seq.mark_deleted("Rex", 2),
            Err(SequenceError::Persistence(_))
        ));
        assert_eq!(seq.state(), before);
        let view = seq.view().unwrap();
        assert_eq!(number(&view), Some(3));
        assert_eq!(view.total, 3);
    }

    #[test]
    fn failed_bulk_mark_keeps_prior_cursor() {
        let mut seq = rex_read_only_for(vec![2]);
        seq.on_select_subset(&[3, 1]).unwrap();
        seq.on_next().unwrap();
        let before = seq.state();
        let (report, view) = seq.mark_deleted_many(&[1, 2]).unwrap();
        assert_eq!(report.changed, vec![1]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 2);
        assert_eq!(seq.state(), before);
        assert_eq!(view.mode, CursorMode::Explicit);
        assert_eq!(number(&view), Some(1));
        assert!(view.can_undelete);
    }

    #[test]
    fn legacy_session_view_json_reads_active() {
        let mut legacy = Session::new("Rex", 1, d(1));
        legacy.status = None;
        let mut seq = Sequencer::new(
            MemoryStore::with_sessions([legacy]),
            OrdinalMode::Rank,
            StatusFilter::Active,
        );
        seq.select_dog("Rex").unwrap();
        let view = seq.open(1).unwrap();
        assert!(view.can_delete);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["session"]["status"], "active");
        assert_eq!(json["session"]["session_number"], 1);
    }

    #[test]
    fn numbered_sessions_carry_both_numbers() {
        let mut seq = rex();
        seq.mark_deleted("Rex", 1).unwrap();
        let rows = seq.numbered_sessions("Rex", StatusFilter::Active).unwrap();
        let pairs: Vec<(usize, u32)> = rows.iter().map(|(o, s)| (*o, s.session_number)).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3)]);
    }
}
