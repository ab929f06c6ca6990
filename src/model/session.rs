use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Soft-delete status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Deleted,
}

impl SessionStatus {
    /// The value stored in the `status` column
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Deleted => "deleted",
        }
    }

    /// Parse a stored status. NULL is handled by the caller (it means active).
    pub fn parse_status(s: &str) -> Option<SessionStatus> {
        match s {
            "active" => Some(SessionStatus::Active),
            "deleted" => Some(SessionStatus::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sessions are visible and ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    Deleted,
    Both,
}

impl StatusFilter {
    /// Whether a session with the given stored status passes this filter.
    /// A missing status counts as active.
    pub fn matches(self, status: Option<SessionStatus>) -> bool {
        let status = status.unwrap_or(SessionStatus::Active);
        match self {
            StatusFilter::Active => status == SessionStatus::Active,
            StatusFilter::Deleted => status == SessionStatus::Deleted,
            StatusFilter::Both => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Deleted => "deleted",
            StatusFilter::Both => "both",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(StatusFilter::Active),
            "deleted" => Ok(StatusFilter::Deleted),
            "both" | "all" => Ok(StatusFilter::Both),
            other => Err(format!(
                "invalid filter \"{}\" (expected active, deleted, or both)",
                other
            )),
        }
    }
}

/// A logged training session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Partitioning key; numbering and ranking are per dog
    pub dog_name: String,
    /// Physical key, assigned once and never changed
    pub session_number: u32,
    pub date: NaiveDate,
    /// `None` is a row written before statuses existed; it reads as active,
    /// and is written out as active
    #[serde(default, serialize_with = "serialize_effective_status")]
    pub status: Option<SessionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Session {
    /// A new active session with no detail fields
    pub fn new(dog_name: impl Into<String>, session_number: u32, date: NaiveDate) -> Self {
        Session {
            dog_name: dog_name.into(),
            session_number,
            date,
            status: Some(SessionStatus::Active),
            handler: None,
            location: None,
            notes: None,
        }
    }

    /// Stored status with NULL folded into active
    pub fn effective_status(&self) -> SessionStatus {
        self.status.unwrap_or(SessionStatus::Active)
    }

    pub fn key(&self) -> SessionKey {
        SessionKey {
            session_number: self.session_number,
            date: self.date,
        }
    }
}

fn serialize_effective_status<S: serde::Serializer>(
    status: &Option<SessionStatus>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    status.unwrap_or(SessionStatus::Active).serialize(serializer)
}

/// The part of a session that ordering and navigation look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionKey {
    pub session_number: u32,
    pub date: NaiveDate,
}

/// Fields supplied when creating or editing a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDraft {
    /// `None` creates a new session with the next physical number
    pub session_number: Option<u32>,
    pub date: Option<NaiveDate>,
    pub handler: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
