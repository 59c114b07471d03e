use thiserror::Error;

/// Caller bugs surfaced by the window selector.
///
/// Unusable timestamps and empty reading lists are not errors; they resolve
/// to a fallback selection instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
