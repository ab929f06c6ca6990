use serde::{Deserialize, Serialize};

use crate::model::session::StatusFilter;
use crate::ops::listing::Listing;

/// Which session is on display, and what Previous/Next walk over.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Cursor {
    /// Nothing loaded; the form shows a new session
    #[default]
    Unset,
    /// Walks the whole filtered listing of `dog`
    Implicit {
        dog: String,
        filter: StatusFilter,
        session_number: u32,
    },
    /// Walks a subset picked by the user, in pick order
    Explicit {
        dog: String,
        selection: Vec<u32>,
        index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorMode {
    Unset,
    Implicit,
    Explicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Everything that can move the cursor
#[derive(Debug, Clone, Copy)]
pub enum CursorEvent<'a> {
    /// A session was found and loaded by physical number
    Load {
        dog: &'a str,
        filter: StatusFilter,
        session_number: u32,
    },
    /// A typed number has no session; show a new one instead
    Missing,
    /// The "New" button
    New,
    /// A different dog was selected
    DogChanged,
    /// The picker returned a subset
    SelectSubset {
        dog: &'a str,
        selection: &'a [u32],
    },
    /// Previous/Next against a freshly fetched listing
    Step {
        direction: Direction,
        listing: &'a Listing,
    },
    FilterChanged(StatusFilter),
}

impl Cursor {
    pub fn mode(&self) -> CursorMode {
        match self {
            Cursor::Unset => CursorMode::Unset,
            Cursor::Implicit { .. } => CursorMode::Implicit,
            Cursor::Explicit { .. } => CursorMode::Explicit,
        }
    }

    /// The dog and physical number on display, if any
    pub fn current(&self) -> Option<(&str, u32)> {
        match self {
            Cursor::Unset => None,
            Cursor::Implicit {
                dog,
                session_number,
                ..
            } => Some((dog.as_str(), *session_number)),
            Cursor::Explicit {
                dog,
                selection,
                index,
            } => selection.get(*index).map(|n| (dog.as_str(), *n)),
        }
    }

    /// `(index + 1, len)` while walking a picked subset
    pub fn explicit_position(&self) -> Option<(usize, usize)> {
        match self {
            Cursor::Explicit {
                selection, index, ..
            } if *index < selection.len() => Some((index + 1, selection.len())),
            _ => None,
        }
    }
}

/// Next cursor state for an event. Pure: the caller fetches any listing the
/// event needs and reloads whatever session the new state points at.
pub fn transition(cursor: &Cursor, event: CursorEvent<'_>) -> Cursor {
    match event {
        CursorEvent::Missing | CursorEvent::New | CursorEvent::DogChanged => Cursor::Unset,

        CursorEvent::Load {
            dog,
            filter,
            session_number,
        } => {
            // Reloading the subset's current element keeps the subset
            if cursor.mode() == CursorMode::Explicit && cursor.current() == Some((dog, session_number))
            {
                return cursor.clone();
            }
            Cursor::Implicit {
                dog: dog.to_string(),
                filter,
                session_number,
            }
        }

        CursorEvent::SelectSubset { dog, selection } => {
            let mut picked: Vec<u32> = Vec::with_capacity(selection.len());
            for n in selection {
                if !picked.contains(n) {
                    picked.push(*n);
                }
            }
            if picked.is_empty() {
                Cursor::Unset
            } else {
                Cursor::Explicit {
                    dog: dog.to_string(),
                    selection: picked,
                    index: 0,
                }
            }
        }

        CursorEvent::Step { direction, listing } => {
            if !can_step(cursor, direction, listing) {
                return cursor.clone();
            }
            match cursor {
                Cursor::Unset => Cursor::Unset,
                Cursor::Explicit {
                    dog,
                    selection,
                    index,
                } => Cursor::Explicit {
                    dog: dog.clone(),
                    selection: selection.clone(),
                    index: match direction {
                        Direction::Previous => index - 1,
                        Direction::Next => index + 1,
                    },
                },
                Cursor::Implicit {
                    dog,
                    filter,
                    session_number,
                } => {
                    // can_step guarantees the number is present with a neighbor
                    let pos = listing.position_of(*session_number).unwrap_or(0);
                    let target = match direction {
                        Direction::Previous => pos - 1,
                        Direction::Next => pos + 1,
                    };
                    Cursor::Implicit {
                        dog: dog.clone(),
                        filter: *filter,
                        session_number: listing.keys()[target].session_number,
                    }
                }
            }
        }

        CursorEvent::FilterChanged(filter) => match cursor {
            Cursor::Implicit {
                dog,
                session_number,
                ..
            } => Cursor::Implicit {
                dog: dog.clone(),
                filter,
                session_number: *session_number,
            },
            other => other.clone(),
        },
    }
}

/// Whether Previous/Next is enabled. `listing` must be freshly fetched for
/// the implicit cursor's dog and filter; explicit cursors ignore it.
pub fn can_step(cursor: &Cursor, direction: Direction, listing: &Listing) -> bool {
    match cursor {
        Cursor::Unset => false,
        Cursor::Explicit {
            selection, index, ..
        } => {
            if *index >= selection.len() {
                return false;
            }
            match direction {
                Direction::Previous => *index > 0,
                Direction::Next => index + 1 < selection.len(),
            }
        }
        Cursor::Implicit { session_number, .. } => match listing.position_of(*session_number) {
            // Not in the listing: the session left the filter
            None => false,
            Some(pos) => match direction {
                Direction::Previous => pos > 0,
                Direction::Next => pos + 1 < listing.len(),
            },
        },
    }
}
