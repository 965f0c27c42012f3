//! The cloud side of dual-mode storage, as an object-safe async trait.
//!
//! [`SyncClient`](crate::SyncClient) only ever sees `Arc<dyn CloudActor>`,
//! so transports swap freely: the HTTP adapter in production, scripted
//! in-memory actors in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lotus_core::{
    DomainError, ExportBundle, ImportSummary, JournalDraft, JournalEntry, ProgressStats, Ritual,
    RitualDraft, SessionDraft, SessionRecord, UserProfile,
};

/// Failure as reported by a cloud actor. Deliberately narrower than
/// [`SyncError`](crate::SyncError): an actor cannot report local store or
/// codec problems, only its own.
#[derive(Debug)]
pub enum CloudError {
    Unauthorized(String),
    /// The backing service is reachable but not serving yet.
    NotReady(String),
    /// The remote enforced a business rule. Must match what the guest
    /// vault enforces locally.
    Domain(DomainError),
    Other(String),
}

/// Coarse remote-side role, for gating admin surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

/// Remote storage for a signed-in identity.
///
/// The actor assigns record ids; drafts go in, completed records come
/// back. Implementations must enforce the same ritual admission rules as
/// the guest vault (duplicate configuration, per-user cap) and report
/// them as [`CloudError::Domain`].
#[async_trait]
pub trait CloudActor: Send + Sync {
    async fn add_journal_entry(&self, draft: JournalDraft) -> Result<JournalEntry, CloudError>;
    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, CloudError>;
    async fn update_journal_entry(&self, entry: JournalEntry) -> Result<(), CloudError>;
    async fn delete_journal_entry(&self, id: u64) -> Result<(), CloudError>;

    async fn record_session(&self, draft: SessionDraft) -> Result<SessionRecord, CloudError>;
    async fn progress(&self) -> Result<ProgressStats, CloudError>;

    async fn save_ritual(&self, draft: RitualDraft) -> Result<Ritual, CloudError>;
    async fn list_rituals(&self) -> Result<Vec<Ritual>, CloudError>;
    async fn delete_ritual(&self, id: u64) -> Result<(), CloudError>;

    async fn get_profile(&self) -> Result<Option<UserProfile>, CloudError>;
    async fn save_profile(&self, profile: UserProfile) -> Result<(), CloudError>;
    async fn role(&self) -> Result<UserRole, CloudError>;

    async fn export_bundle(&self) -> Result<ExportBundle, CloudError>;
    async fn import_bundle(&self, bundle: ExportBundle) -> Result<ImportSummary, CloudError>;
}
