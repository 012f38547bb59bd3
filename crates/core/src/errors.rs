use thiserror::Error;

/// Failure talking to a hosted advisory service (language model or
/// weather). Every variant is recoverable: the pipeline degrades to a
/// data-only answer instead of aborting.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdvisoryError {
    #[error("advisory request timed out after {waited_secs}s")]
    Timeout { waited_secs: u64 },
    #[error("advisory transport failure: {0}")]
    Transport(String),
    #[error("advisory quota exhausted: {0}")]
    Quota(String),
    #[error("advisory response malformed: {0}")]
    Malformed(String),
}
