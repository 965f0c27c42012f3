use std::fmt;

use lotus_core::{BundleError, DomainError};

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// Stored or file data that cannot be used: corrupt rows, unreadable
    /// paths. Not a business-rule rejection.
    InvalidData(String),
    /// Import/export codec failure, kept typed so callers can tell
    /// "not JSON" apart from "not a bundle".
    Bundle(BundleError),
    /// Business-rule rejection; the data was fine, the operation was not.
    Domain(DomainError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "SQLite error: {e}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            StoreError::Bundle(e) => write!(f, "bundle error: {e}"),
            StoreError::Domain(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<DomainError> for StoreError {
    fn from(e: DomainError) -> Self {
        StoreError::Domain(e)
    }
}

impl From<BundleError> for StoreError {
    fn from(e: BundleError) -> Self {
        StoreError::Bundle(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
