use specgen_model::{ErrorKind, ModelProviderError};
use thiserror::Error;

/// Errors that end an agent run.
///
/// Tool failures never show up here, they are reported to the model as
/// tool results instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The model request failed. Requests are never retried.
    #[error("model request failed ({kind}): {message}")]
    Model {
        /// What went wrong, as classified by the provider.
        kind: ErrorKind,
        /// The provider's error message.
        message: String,
    },
}

impl Error {
    pub(crate) fn from_provider(err: &dyn ModelProviderError) -> Self {
        Error::Model {
            kind: err.kind(),
            message: format!("{err}"),
        }
    }
}
