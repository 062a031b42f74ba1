//! The event log: a record of what a pass run did and declined to do.
//!
//! Events are diagnostics, not data the transformations depend on. The log is
//! backed by `boxcar::Vec` so the parallel discovery phases can append
//! through a shared reference without locking.

use std::fmt;

use crate::metadata::token::Token;

/// The kind of activity an [`Event`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A static initialiser was replaced by encoded field defaults
    ClinitReplaced,
    /// A field-to-field initialiser dependency was discovered
    DependencyFound,
    /// A dependency pair was rejected because its register is read later
    PropagationRejected,
    /// A field's value was resolved through constant propagation
    FieldResolved,
    /// A static read was rewritten to a constant load
    SgetInlined,
    /// A dead field definition was removed
    FieldRemoved,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::ClinitReplaced => "clinit-replaced",
            EventKind::DependencyFound => "dependency-found",
            EventKind::PropagationRejected => "propagation-rejected",
            EventKind::FieldResolved => "field-resolved",
            EventKind::SgetInlined => "sget-inlined",
            EventKind::FieldRemoved => "field-removed",
        };
        write!(f, "{}", name)
    }
}

/// One recorded activity.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened
    pub kind: EventKind,
    /// Token of the class, field, or method concerned
    pub token: Token,
    /// Human-readable detail
    pub detail: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.kind, self.token, self.detail)
    }
}

/// An append-only log of [`Event`]s.
#[derive(Debug, Default)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. Takes a shared reference; safe from parallel phases.
    pub fn record(&self, kind: EventKind, token: Token, detail: impl Into<String>) {
        self.events.push(Event {
            kind,
            token,
            detail: detail.into(),
        });
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the recorded events.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, event)| event)
    }

    /// Counts the events of one kind.
    #[must_use]
    pub fn count_of(&self, kind: EventKind) -> usize {
        self.iter().filter(|e| e.kind == kind).count()
    }
}
