// Local crates
use crate::{
    normalizer::models::Privacy,
    output::sink::Property,
    poller::error::{ValidationError, WatchError},
    source::source::LogLevel,
};

// External crates
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// How far back each streaming poll reaches.
pub const STREAMING_LOOKBACK_SECS: i64 = 5 * 60;
/// Pause between two streaming polls.
pub const STREAMING_DELAY: Duration = Duration::from_secs(1);

pub fn streaming_lookback() -> TimeDelta {
    TimeDelta::seconds(STREAMING_LOOKBACK_SECS)
}

/// What the user asked to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub streaming: bool,
    pub log_level: Option<LogLevel>,
    /// Comma separated column list, e.g. `date, type, code, text`.
    pub properties: String,
    pub privacy: Privacy,
    pub show_recent_history: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            streaming: false,
            log_level: None,
            properties: Property::DEFAULT_LIST.to_string(),
            privacy: Privacy::default(),
            show_recent_history: false,
        }
    }
}

impl WatchOptions {
    /// Check every rule and return the selected columns.
    ///
    /// All violations are collected so that each one can be reported on its own line.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<Vec<Property>, WatchError> {
        let mut errors = Vec::new();

        if self.streaming {
            if self.end_date.is_some() {
                errors.push(ValidationError::EndDateWhileStreaming);
            }
            if self.start_date.is_some_and(|start| start > now) {
                errors.push(ValidationError::FutureStartDate);
            }
        } else if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                errors.push(ValidationError::StartAfterEnd);
            }
        }

        let properties = match Property::parse_list(&self.properties) {
            Ok(properties) if properties.is_empty() => {
                errors.push(ValidationError::NoProperties);
                properties
            }
            Ok(properties) => properties,
            Err(unknown) => {
                errors.extend(unknown.into_iter().map(ValidationError::UnknownProperty));
                Vec::new()
            }
        };

        if errors.is_empty() {
            Ok(properties)
        } else {
            Err(WatchError::Validation(errors))
        }
    }

    /// Whether the priming poll of a streaming watch should be shown.
    pub fn emits_priming_batch(&self) -> bool {
        self.show_recent_history || self.start_date.is_some()
    }
}
