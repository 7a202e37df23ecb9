use thiserror::Error;

use crate::types::SessionId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse gesture config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid gesture config: {0}")]
    Invalid(String),
}

/// Failures inside the matcher. They never escape the recognition boundary;
/// [`crate::recognition::RecognitionEngine::recognize`] downgrades every one
/// of them to an unknown result.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("path has {len} points, need at least {min}")]
    TooFewPoints { len: usize, min: usize },
    #[error("path contains non-finite coordinates")]
    NonFinite,
    #[error("path has no spatial extent")]
    Degenerate,
    #[error("template `{label}` has no spatial extent")]
    DegenerateTemplate { label: String },
    #[error("template corpus is empty")]
    EmptyCorpus,
}

#[derive(Debug, Error, PartialEq)]
pub enum GestureError {
    #[error("bindings cannot change while session {0} is drawing")]
    SessionActive(SessionId),
    #[error("recognition queue is full, dropped session {0}")]
    RecognitionQueueFull(SessionId),
}
