use thiserror::Error;

/// Failure taxonomy for the protocol dispatcher.
///
/// `Payload` and `NotImplemented` are client-facing conditions; `Backend`
/// carries the provider's own detail; `AggregationState` covers fan-in
/// messages that cannot be correlated with a conversation.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("invalid request payload: {0}")]
    Payload(String),

    #[error("'{0}' is not implemented")]
    NotImplemented(&'static str),

    #[error("backend '{backend}' failed: {detail}")]
    Backend {
        backend: &'static str,
        detail: String,
    },

    #[error("aggregation state error: {0}")]
    AggregationState(String),

    #[error("artifact storage failed: {0}")]
    Artifact(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
