use std::fmt::{self, Display};

/// What went wrong with a tool call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The arguments could not be parsed into the tool's input.
    InvalidInput,
    /// The tool ran and failed.
    ExecutionError,
}

/// A failed tool call. The loop renders its reason back to the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: String,
}

impl Error {
    /// The arguments don't fit the tool's input.
    #[inline]
    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            reason: reason.into(),
        }
    }

    /// The tool failed while running.
    #[inline]
    pub fn execution_error<S: Into<String>>(reason: S) -> Self {
        Self {
            kind: ErrorKind::ExecutionError,
            reason: reason.into(),
        }
    }

    /// Returns the kind of the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the text shown to the model.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_input(err.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::InvalidInput => {
                write!(f, "invalid input: {}", self.reason)
            }
            ErrorKind::ExecutionError => {
                write!(f, "execution failed: {}", self.reason)
            }
        }
    }
}

impl std::error::Error for Error {}
