//! SQLite-backed guest vault for the lotus meditation companion.
//!
//! Guest mode keeps everything on the local device: journal entries,
//! session history, progress counters, and saved rituals, stored as
//! wire-format JSON under fixed keys. The vault enforces the same
//! business rules the cloud side does (ritual duplicate/limit checks),
//! so switching modes never changes what is allowed.

pub mod error;
pub mod json_bridge;
pub mod project;
pub mod schema;
pub mod vault;

pub use error::{Result, StoreError};
pub use vault::GuestVault;
