// Local crates
use crate::source::models::{Alert, Call, Message};

// External crates
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;

/// Severity accepted by the monitor API's `LogLevel` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warning,
    Notice,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Notice => "notice",
            LogLevel::Debug => "debug",
        }
    }

    /// Whether an alert's `log_level` field belongs to this level.
    pub fn matches(&self, raw: &str) -> bool {
        raw.eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time window and narrowing shared by the three list queries of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub log_level: Option<LogLevel>,
}

impl EventFilter {
    pub fn since(start_date: DateTime<Utc>) -> Self {
        Self {
            start_date,
            end_date: None,
            log_level: None,
        }
    }
}

/// Failures surfaced by an [`EventSource`].
///
/// `Api` carries the platform's own error code, which becomes the process exit code.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("missing credentials: set account.{0} in the config file or EVENT_WATCH__ACCOUNT__{1}")]
    MissingCredentials(&'static str, &'static str),
}

impl SourceError {
    /// Platform error code, if the failure came from the API itself.
    pub fn code(&self) -> Option<i64> {
        match self {
            SourceError::Api { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

/// The platform's three event listings.
///
/// Implementations return records newest-first, the order the platform lists them in.
pub trait EventSource {
    fn list_alerts(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<Vec<Alert>, SourceError>> + Send;

    fn list_messages(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<Vec<Message>, SourceError>> + Send;

    fn list_calls(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<Vec<Call>, SourceError>> + Send;
}
