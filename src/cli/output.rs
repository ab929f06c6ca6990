use chrono::NaiveDate;
use serde::Serialize;

use crate::model::session::{Session, SessionStatus, StatusFilter};
use crate::ops::cursor::CursorMode;
use crate::ops::sequencer::SessionView;
use crate::ops::status_ops::BulkReport;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SessionJson {
    pub dog: String,
    pub session_number: u32,
    pub date: NaiveDate,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct ListedSessionJson {
    pub ordinal: usize,
    #[serde(flatten)]
    pub session: SessionJson,
}

#[derive(Serialize)]
pub struct SessionListJson {
    pub dog: String,
    pub filter: StatusFilter,
    pub sessions: Vec<ListedSessionJson>,
}

#[derive(Serialize)]
pub struct BulkJson<'a> {
    pub report: &'a BulkReport,
    pub view: &'a SessionView,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn session_to_json(session: &Session) -> SessionJson {
    SessionJson {
        dog: session.dog_name.clone(),
        session_number: session.session_number,
        date: session.date,
        status: session.effective_status(),
        handler: session.handler.clone(),
        location: session.location.clone(),
        notes: session.notes.clone(),
    }
}

pub fn session_list_to_json(
    dog: &str,
    filter: StatusFilter,
    rows: &[(usize, Session)],
) -> SessionListJson {
    SessionListJson {
        dog: dog.to_string(),
        filter,
        sessions: rows
            .iter()
            .map(|(ordinal, session)| ListedSessionJson {
                ordinal: *ordinal,
                session: session_to_json(session),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One listing line: displayed ordinal, then the physical number in brackets
pub fn format_session_line(ordinal: usize, session: &Session) -> String {
    let mut line = format!(
        "{:>3}. [{}] {}  {}",
        ordinal,
        session.session_number,
        session.date,
        session.effective_status()
    );
    if let Some(ref location) = session.location {
        line.push_str(&format!("  @{}", location));
    }
    if let Some(ref handler) = session.handler {
        line.push_str(&format!("  ({})", handler));
    }
    line
}

pub fn format_session_list(dog: &str, filter: StatusFilter, rows: &[(usize, Session)]) -> String {
    let mut out = format!("{} ({}): {} sessions\n", dog, filter, rows.len());
    for (ordinal, session) in rows {
        out.push_str(&format_session_line(*ordinal, session));
        out.push('\n');
    }
    out
}

/// The form as text: header with the displayed ordinal, then details and
/// the enabled actions.
pub fn format_view(view: &SessionView) -> String {
    let Some(ref dog) = view.dog else {
        return "no dog selected\n".to_string();
    };

    let Some(ref session) = view.session else {
        return format!(
            "{}: new session #{} ({} filter, {} logged)\n",
            dog, view.ordinal, view.filter, view.total
        );
    };

    let mut out = format!(
        "{}: #{} of {} ({} filter)\n",
        dog, view.ordinal, view.total, view.filter
    );
    out.push_str(&format!("  session: {}\n", session.session_number));
    out.push_str(&format!("  date: {}\n", session.date));
    out.push_str(&format!("  status: {}\n", session.effective_status()));
    if let Some(ref handler) = session.handler {
        out.push_str(&format!("  handler: {}\n", handler));
    }
    if let Some(ref location) = session.location {
        out.push_str(&format!("  location: {}\n", location));
    }
    if let Some(ref notes) = session.notes {
        out.push_str(&format!("  notes: {}\n", notes));
    }
    if view.mode == CursorMode::Explicit
        && let Some((pos, len)) = view.explicit_position
    {
        out.push_str(&format!("  picked: {} of {}\n", pos, len));
    }
    if view.stale_membership {
        out.push_str(&format!("  not in the {} filter\n", view.filter));
    }
    out.push_str(&format!("  actions: {}\n", format_actions(view)));
    out
}

fn format_actions(view: &SessionView) -> String {
    let actions: Vec<&str> = [
        (view.can_go_previous, "prev"),
        (view.can_go_next, "next"),
        (view.can_delete, "delete"),
        (view.can_undelete, "undelete"),
    ]
    .iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, name)| *name)
    .collect();
    if actions.is_empty() {
        "none".to_string()
    } else {
        actions.join(" ")
    }
}

pub fn format_bulk_report(verb: &str, report: &BulkReport) -> String {
    let mut out = String::new();
    if !report.changed.is_empty() {
        out.push_str(&format!("{}: {}\n", verb, join_numbers(&report.changed)));
    }
    if !report.unchanged.is_empty() {
        out.push_str(&format!("unchanged: {}\n", join_numbers(&report.unchanged)));
    }
    if !report.not_found.is_empty() {
        out.push_str(&format!("not found: {}\n", join_numbers(&report.not_found)));
    }
    for (number, message) in &report.failed {
        out.push_str(&format!("failed: {} ({})\n", number, message));
    }
    out
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
