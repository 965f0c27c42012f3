//! Typed failure taxonomy for dual-mode operations.
//!
//! Classification is structural, never by message sniffing: the variant
//! alone decides whether an operation retries and which message the UI
//! shows. Exactly one variant is retry-eligible.

use std::fmt;

use lotus_core::{BundleError, DomainError};
use lotus_store::StoreError;

use crate::actor::CloudError;

#[derive(Debug)]
pub enum SyncError {
    /// The caller is not signed in, or the remote rejected the identity.
    Unauthorized(String),
    /// The cloud connection exists but is not serving yet. The only
    /// variant worth retrying.
    NotReady(String),
    /// Business-rule rejection; retrying would fail identically.
    Domain(DomainError),
    /// Local vault failure.
    Store(StoreError),
    /// Import/export codec failure.
    Bundle(BundleError),
    /// Remote failure that is neither auth, readiness, nor a domain rule.
    Remote(String),
    /// The surrounding operation was cancelled.
    Cancelled,
}

impl SyncError {
    /// True only for [`SyncError::NotReady`]: a connection that is warming
    /// up can succeed on a second attempt; nothing else here can.
    pub fn retry_eligible(&self) -> bool {
        matches!(self, SyncError::NotReady(_))
    }

    /// The user-facing wording for this failure. Domain and bundle errors
    /// each keep a condition-specific message; the rest collapse into a
    /// small set of generic ones.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Unauthorized(_) => "please sign in to use cloud sync".into(),
            SyncError::NotReady(_) => {
                "cloud sync is still connecting, try again in a moment".into()
            }
            SyncError::Domain(e) => e.to_string(),
            SyncError::Bundle(BundleError::InvalidJson(_)) => {
                "that file is not valid JSON".into()
            }
            SyncError::Bundle(BundleError::InvalidStructure(_)) => {
                "that file is not a valid lotus export".into()
            }
            SyncError::Store(_) | SyncError::Remote(_) => {
                "something went wrong, please try again".into()
            }
            SyncError::Cancelled => "operation cancelled".into(),
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            SyncError::NotReady(msg) => write!(f, "cloud not ready: {msg}"),
            SyncError::Domain(e) => write!(f, "{e}"),
            SyncError::Store(e) => write!(f, "store error: {e}"),
            SyncError::Bundle(e) => write!(f, "bundle error: {e}"),
            SyncError::Remote(msg) => write!(f, "remote error: {msg}"),
            SyncError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<DomainError> for SyncError {
    fn from(e: DomainError) -> Self {
        SyncError::Domain(e)
    }
}

impl From<BundleError> for SyncError {
    fn from(e: BundleError) -> Self {
        SyncError::Bundle(e)
    }
}

/// Store failures unwrap their typed payloads so classification does not
/// depend on which substrate raised the condition.
impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Domain(d) => SyncError::Domain(d),
            StoreError::Bundle(b) => SyncError::Bundle(b),
            other => SyncError::Store(other),
        }
    }
}

impl From<CloudError> for SyncError {
    fn from(e: CloudError) -> Self {
        match e {
            CloudError::Unauthorized(msg) => SyncError::Unauthorized(msg),
            CloudError::NotReady(msg) => SyncError::NotReady(msg),
            CloudError::Domain(d) => SyncError::Domain(d),
            CloudError::Other(msg) => SyncError::Remote(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
