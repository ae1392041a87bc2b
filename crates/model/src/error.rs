use std::fmt::{self, Display, Formatter};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The credentials were rejected by the provider.
    Authentication,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The request could not be delivered or the body could not be read.
    Transport,
    /// The provider answered with something that is not a valid response.
    InvalidResponse,
    /// Any other errors.
    Other,
}

impl ErrorKind {
    /// Maps an HTTP status code of a failed request to an error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Authentication,
            429 => ErrorKind::RateLimitExceeded,
            _ => ErrorKind::Other,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Authentication => write!(f, "authentication failed"),
            ErrorKind::RateLimitExceeded => write!(f, "rate limit exceeded"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::InvalidResponse => write!(f, "invalid response"),
            ErrorKind::Other => write!(f, "other error"),
        }
    }
}
