/// Unified error type for the voxgate crate.
///
/// Nothing here reaches a websocket client directly: the resolver turns failures into
/// [`crate::Command`] values and the dispatcher into status strings. The variants only
/// travel between internal layers and out of the HTTP management surface.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Functionality not available on this host.
    #[error("not implemented")]
    NotImplemented,
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The addressed item does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("inventory error: {0}")]
    Inventory(String),
    /// The application discovery script failed or produced nothing usable.
    #[error("discovery error: {0}")]
    Discovery(String),
    #[error("{0}")]
    Transcription(String),
    /// The generative aid failed, timed out or returned nothing.
    #[error("generative aid error: {0}")]
    GenerativeAid(String),
    /// A host automation primitive failed.
    #[error("platform error: {0}")]
    Platform(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for GatewayError {
    fn from(error: std::io::Error) -> Self {
        GatewayError::Io(error.to_string())
    }
}

/// Result type alias using [`GatewayError`].
pub type GatewayResult<T> = Result<T, GatewayError>;
