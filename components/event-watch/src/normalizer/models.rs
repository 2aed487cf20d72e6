// External crates
use chrono::{DateTime, Utc};
use std::fmt;

/// Event source category. Selects the field mapping and the dedup identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Debugger,
    Message,
    Call,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Debugger, Category::Message, Category::Call];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Debugger => "debugger",
            Category::Message => "message",
            Category::Call => "call",
        })
    }
}

/// Classification shown in the `type` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Debugger alert, carrying its log level.
    Debugger(String),
    MessageIn,
    MessageOut,
    CallIn,
    CallOut,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Debugger(level) => f.write_str(level),
            EventKind::MessageIn => f.write_str("message[in]"),
            EventKind::MessageOut => f.write_str("message[out]"),
            EventKind::CallIn => f.write_str("call[in]"),
            EventKind::CallOut => f.write_str("call[out]"),
        }
    }
}

/// One row of the unified log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub date: DateTime<Utc>,
    pub kind: EventKind,
    pub code: String,
    pub text: String,
}

/// Display-time redaction switches (`--no-pii`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Privacy {
    pub redact_pii: bool,
}
