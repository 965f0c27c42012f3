//! Dual-mode data access for the lotus meditation companion.
//!
//! Every data operation flows through [`SyncClient`], which re-checks the
//! session at call time: with a signed-in identity it talks to a
//! [`CloudActor`] (readiness-aware, with bounded retry and cached reads),
//! otherwise it uses the local [`GuestVault`](lotus_store::GuestVault)
//! directly. Callers never branch on mode themselves.

pub mod actor;
pub mod cache;
pub mod error;
pub mod http;
pub mod ops;
pub mod retry;
pub mod session;

pub use actor::{CloudActor, CloudError, UserRole};
pub use error::{Result, SyncError};
pub use http::HttpCloudActor;
pub use ops::SyncClient;
pub use retry::RetryPolicy;
pub use session::{CloudSession, Identity};
