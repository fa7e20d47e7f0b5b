use thiserror::Error;

/// Formats a state value the way scan errors and the debug trace show it.
///
/// The default state renders as `nil`, a named state as `:NAME`.
pub fn state_repr(state: Option<&str>) -> String {
    match state {
        Some(name) => format!(":{}", name),
        None => String::from("nil"),
    }
}

/// Errors raised while compiling a grammar into a scanner or while
/// scanning input. All scanner-level errors are fatal to the current
/// parse; there is no retry or recovery.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("can not match ({state}) at {location}: '{rest}'")]
    ScanFailure {
        state: String,
        location: String,
        rest: String,
    },
    #[error("undefined state at {location}: '{state}'")]
    UndefinedState { state: String, location: String },
    #[error("bad lexical result at {location}: {value}")]
    MalformedResult { value: String, location: String },
    #[error("invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn scan_failure(state: Option<&str>, location: String, rest: &str) -> Self {
        ScanError::ScanFailure {
            state: state_repr(state),
            location,
            rest: rest.to_string(),
        }
    }

    pub fn undefined_state(state: Option<&str>, location: String) -> Self {
        ScanError::UndefinedState {
            state: state_repr(state),
            location,
        }
    }

    pub fn bad_lexical_result(value: String, location: String) -> Self {
        ScanError::MalformedResult { value, location }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScanError::ScanFailure { .. } => "ScanFailure",
            ScanError::UndefinedState { .. } => "UndefinedState",
            ScanError::MalformedResult { .. } => "MalformedResult",
            ScanError::InvalidPattern { .. } => "InvalidPattern",
            ScanError::Io(..) => "Io",
        }
    }
}
