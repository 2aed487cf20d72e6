// Local crates
use crate::source::source::SourceError;

/// Exit status for rejected options.
pub const VALIDATION_EXIT_CODE: i32 = 1;
/// Exit status for failures that carry no platform error code.
pub const GENERIC_EXIT_CODE: i32 = 1;

/// A single rejected option combination.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Cannot specify an end date when streaming.")]
    EndDateWhileStreaming,
    #[error("Cannot specify a start date in the future when streaming.")]
    FutureStartDate,
    #[error("The start date must not be after the end date.")]
    StartAfterEnd,
    #[error("Unknown property '{0}', expected one of: date, type, code, text.")]
    UnknownProperty(String),
    #[error("At least one property must be selected.")]
    NoProperties,
}

/// Everything that ends a watch early.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// One line per violated rule.
    #[error("{}", join_lines(.0))]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Fetch(#[from] SourceError),
    #[error("failed to write events: {0}")]
    Output(#[from] std::io::Error),
}

impl WatchError {
    /// Process exit status for this failure.
    ///
    /// Fetch failures exit with the platform's error code when there is one.
    pub fn exit_code(&self) -> i32 {
        match self {
            WatchError::Validation(_) => VALIDATION_EXIT_CODE,
            WatchError::Fetch(err) => err
                .code()
                .and_then(|code| i32::try_from(code).ok())
                .filter(|code| *code != 0)
                .unwrap_or(GENERIC_EXIT_CODE),
            WatchError::Output(_) => GENERIC_EXIT_CODE,
        }
    }
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
