use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("server not found")]
    ServerNotFound,
}

/// Delivery failure towards a single subscriber. Handled by dropping that
/// subscriber, never reported to the ingest caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("subscriber channel closed")]
    Closed,

    #[error("subscriber write timed out")]
    TimedOut,
}

pub type Result<T> = std::result::Result<T, StoreError>;
