use cl_chain_client::ChainQueryError;
use cl_denom_codec::CodecError;
use thiserror::Error;

/// Why an IBC hash could not be turned into metadata.
///
/// Never cached: a later call asks the chain again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("denom trace not found: {0}")]
    NotFound(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("malformed denom trace: {0}")]
    Malformed(String),
}

impl From<ChainQueryError> for ResolutionError {
    fn from(err: ChainQueryError) -> Self {
        match err {
            ChainQueryError::NotFound(msg) => ResolutionError::NotFound(msg),
            ChainQueryError::Network(msg) => ResolutionError::Network(msg),
            ChainQueryError::Malformed(msg) => ResolutionError::Malformed(msg),
        }
    }
}

/// Error surface of [`crate::DenomFacade::resolve_display_async`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DenomError {
    #[error(transparent)]
    MalformedHash(#[from] CodecError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
