/// Failure kinds of a split action
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    /// The source image could not be fetched or decoded
    #[error("failed to load image: {0}")]
    Decode(String),

    /// The update call never produced a usable response
    #[error("cover update failed: {0}")]
    RemoteTransport(String),

    /// The server answered but rejected the mutation
    #[error("{0}")]
    RemoteDomain(String),
}

impl SplitError {
    pub fn decode(err: impl std::fmt::Debug) -> Self {
        SplitError::Decode(format!("{:?}", err))
    }

    pub fn transport(err: impl std::fmt::Debug) -> Self {
        SplitError::RemoteTransport(format!("{:?}", err))
    }
}
