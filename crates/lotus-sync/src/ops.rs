//! The mode-agnostic operation surface.
//!
//! [`SyncClient`] owns both substrates and re-checks the session at every
//! call: signed in, the operation runs against the cloud actor under the
//! retry policy, with reads cached per resource; signed out, it goes
//! straight to the guest vault, always fresh. Mutations invalidate the
//! resource they touched; mode switches drop the whole cache.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use lotus_core::{
    ExportBundle, GrowthState, ImportSummary, JournalDraft, JournalEntry, ProgressStats, Ritual,
    RitualDraft, SessionDraft, SessionRecord, UserProfile, compute_growth_state, export_json,
    import_json,
};
use lotus_store::{GuestVault, StoreError};

use crate::actor::{CloudActor, UserRole};
use crate::cache::{QueryCache, Resource};
use crate::error::{Result, SyncError};
use crate::retry::{RetryPolicy, run_cloud_op};
use crate::session::{CloudSession, Identity};

pub struct SyncClient {
    session: Arc<CloudSession>,
    vault: Arc<Mutex<GuestVault>>,
    policy: RetryPolicy,
    cancel: CancellationToken,
    cache: QueryCache,
}

impl SyncClient {
    /// A client starting in guest mode with the default retry policy.
    pub fn new(vault: GuestVault) -> Self {
        Self::with_policy(vault, RetryPolicy::default())
    }

    pub fn with_policy(vault: GuestVault, policy: RetryPolicy) -> Self {
        SyncClient {
            session: Arc::new(CloudSession::new()),
            vault: Arc::new(Mutex::new(vault)),
            policy,
            cancel: CancellationToken::new(),
            cache: QueryCache::new(),
        }
    }

    pub fn session(&self) -> Arc<CloudSession> {
        self.session.clone()
    }

    /// Token that aborts in-flight readiness waits and retry pauses.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Switch to cloud mode. Guest-era cached reads are dropped.
    pub async fn sign_in(&self, identity: Identity, actor: Arc<dyn CloudActor>) {
        info!(principal = %identity.principal, "signing in to cloud sync");
        self.session.connect(identity, actor).await;
        self.cache.clear().await;
    }

    /// Back to guest mode. Cloud reads must not leak across.
    pub async fn sign_out(&self) {
        info!("signing out of cloud sync");
        self.session.disconnect().await;
        self.cache.clear().await;
    }

    /// Re-evaluated on every operation, never stored by callers.
    pub async fn is_cloud(&self) -> bool {
        self.session.authenticated().await
    }

    // --- Journal ---

    pub async fn add_journal_entry(&self, draft: JournalDraft) -> Result<JournalEntry> {
        if self.is_cloud().await {
            let entry = run_cloud_op(&self.session, &self.policy, &self.cancel, move |actor| {
                let draft = draft.clone();
                async move { actor.add_journal_entry(draft).await }
            })
            .await?;
            self.cache.invalidate(Resource::Journal).await;
            Ok(entry)
        } else {
            Ok(self.vault.lock().await.add_journal_entry(draft)?)
        }
    }

    pub async fn journal_entries(&self) -> Result<Vec<JournalEntry>> {
        if self.is_cloud().await {
            if let Some(hit) = self.cache.journal().await {
                debug!("journal read served from cache");
                return Ok(hit);
            }
            let entries =
                run_cloud_op(&self.session, &self.policy, &self.cancel, |actor| async move {
                    actor.list_journal_entries().await
                })
                .await?;
            self.cache.store_journal(entries.clone()).await;
            Ok(entries)
        } else {
            Ok(self.vault.lock().await.list_journal_entries()?)
        }
    }

    pub async fn update_journal_entry(&self, entry: JournalEntry) -> Result<()> {
        if self.is_cloud().await {
            run_cloud_op(&self.session, &self.policy, &self.cancel, move |actor| {
                let entry = entry.clone();
                async move { actor.update_journal_entry(entry).await }
            })
            .await?;
            self.cache.invalidate(Resource::Journal).await;
            Ok(())
        } else {
            Ok(self.vault.lock().await.update_journal_entry(&entry)?)
        }
    }

    pub async fn delete_journal_entry(&self, id: u64) -> Result<()> {
        if self.is_cloud().await {
            run_cloud_op(&self.session, &self.policy, &self.cancel, move |actor| async move {
                actor.delete_journal_entry(id).await
            })
            .await?;
            self.cache.invalidate(Resource::Journal).await;
            Ok(())
        } else {
            Ok(self.vault.lock().await.delete_journal_entry(id)?)
        }
    }

    // --- Sessions / progress ---

    pub async fn record_session(&self, draft: SessionDraft) -> Result<SessionRecord> {
        if self.is_cloud().await {
            let record = run_cloud_op(&self.session, &self.policy, &self.cancel, move |actor| {
                let draft = draft.clone();
                async move { actor.record_session(draft).await }
            })
            .await?;
            self.cache.invalidate(Resource::Progress).await;
            Ok(record)
        } else {
            Ok(self.vault.lock().await.record_session(draft)?)
        }
    }

    pub async fn progress(&self) -> Result<ProgressStats> {
        if self.is_cloud().await {
            if let Some(hit) = self.cache.progress().await {
                debug!("progress read served from cache");
                return Ok(hit);
            }
            let progress =
                run_cloud_op(&self.session, &self.policy, &self.cancel, |actor| async move {
                    actor.progress().await
                })
                .await?;
            self.cache.store_progress(progress.clone()).await;
            Ok(progress)
        } else {
            Ok(self.vault.lock().await.progress()?)
        }
    }

    /// The lotus state for the current lifetime total, whichever substrate
    /// holds it.
    pub async fn growth_state(&self) -> Result<GrowthState> {
        let progress = self.progress().await?;
        Ok(compute_growth_state(progress.total_minutes as f64))
    }

    // --- Rituals ---

    pub async fn save_ritual(&self, draft: RitualDraft) -> Result<Ritual> {
        if self.is_cloud().await {
            let ritual = run_cloud_op(&self.session, &self.policy, &self.cancel, move |actor| {
                let draft = draft.clone();
                async move { actor.save_ritual(draft).await }
            })
            .await?;
            self.cache.invalidate(Resource::Rituals).await;
            Ok(ritual)
        } else {
            Ok(self.vault.lock().await.save_ritual(draft)?)
        }
    }

    pub async fn rituals(&self) -> Result<Vec<Ritual>> {
        if self.is_cloud().await {
            if let Some(hit) = self.cache.rituals().await {
                debug!("ritual read served from cache");
                return Ok(hit);
            }
            let rituals =
                run_cloud_op(&self.session, &self.policy, &self.cancel, |actor| async move {
                    actor.list_rituals().await
                })
                .await?;
            self.cache.store_rituals(rituals.clone()).await;
            Ok(rituals)
        } else {
            Ok(self.vault.lock().await.list_rituals()?)
        }
    }

    pub async fn delete_ritual(&self, id: u64) -> Result<()> {
        if self.is_cloud().await {
            run_cloud_op(&self.session, &self.policy, &self.cancel, move |actor| async move {
                actor.delete_ritual(id).await
            })
            .await?;
            self.cache.invalidate(Resource::Rituals).await;
            Ok(())
        } else {
            Ok(self.vault.lock().await.delete_ritual(id)?)
        }
    }

    // --- Profile / role ---

    /// Guest mode has no profile; reading one is `None`, not an error.
    pub async fn profile(&self) -> Result<Option<UserProfile>> {
        if self.is_cloud().await {
            run_cloud_op(&self.session, &self.policy, &self.cancel, |actor| async move {
                actor.get_profile().await
            })
            .await
        } else {
            Ok(None)
        }
    }

    /// Writing a profile requires an account.
    pub async fn save_profile(&self, profile: UserProfile) -> Result<()> {
        if self.is_cloud().await {
            run_cloud_op(&self.session, &self.policy, &self.cancel, move |actor| {
                let profile = profile.clone();
                async move { actor.save_profile(profile).await }
            })
            .await
        } else {
            Err(SyncError::Unauthorized("guest mode has no profile".into()))
        }
    }

    pub async fn role(&self) -> Result<UserRole> {
        if self.is_cloud().await {
            run_cloud_op(&self.session, &self.policy, &self.cancel, |actor| async move {
                actor.role().await
            })
            .await
        } else {
            Err(SyncError::Unauthorized("guest mode has no role".into()))
        }
    }

    // --- Import / export ---

    pub async fn export_bundle(&self) -> Result<ExportBundle> {
        if self.is_cloud().await {
            run_cloud_op(&self.session, &self.policy, &self.cancel, |actor| async move {
                actor.export_bundle().await
            })
            .await
        } else {
            Ok(self.vault.lock().await.export_bundle()?)
        }
    }

    /// All-or-nothing replacement of the active substrate's data.
    pub async fn import_bundle(&self, bundle: ExportBundle) -> Result<ImportSummary> {
        if self.is_cloud().await {
            let summary = run_cloud_op(&self.session, &self.policy, &self.cancel, move |actor| {
                let bundle = bundle.clone();
                async move { actor.import_bundle(bundle).await }
            })
            .await?;
            self.cache.clear().await;
            Ok(summary)
        } else {
            Ok(self.vault.lock().await.import_bundle(&bundle)?)
        }
    }

    pub async fn export_to_file(&self, path: &Path) -> Result<()> {
        if self.is_cloud().await {
            let bundle = self.export_bundle().await?;
            let json = export_json(&bundle)
                .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))?;
            std::fs::write(path, json).map_err(|e| {
                StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
            })?;
            Ok(())
        } else {
            Ok(self.vault.lock().await.export_json_file(path)?)
        }
    }

    pub async fn import_from_file(&self, path: &Path) -> Result<ImportSummary> {
        if self.is_cloud().await {
            let json = std::fs::read_to_string(path).map_err(|e| {
                StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
            })?;
            let bundle = import_json(&json)?;
            self.import_bundle(bundle).await
        } else {
            Ok(self.vault.lock().await.import_json_file(path)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotus_core::{BundleError, DomainError, EnergyLevel, MeditationType, Mood, Soundscape};

    const T0: u64 = 1_771_632_000;

    fn guest_client() -> SyncClient {
        SyncClient::new(GuestVault::open_in_memory().unwrap())
    }

    fn journal_draft() -> JournalDraft {
        JournalDraft {
            created_at: T0,
            mood: Some(Mood::Grateful),
            energy: EnergyLevel::High,
            gratitude: vec!["quiet morning".into()],
            reflection: "ten minutes before sunrise".into(),
        }
    }

    fn ritual_draft(minutes: u32) -> RitualDraft {
        RitualDraft {
            name: "daily sit".into(),
            meditation_type: MeditationType::Mindfulness,
            duration_minutes: minutes,
            soundscape: Soundscape::Forest,
            volume: 55,
            created_at: T0,
        }
    }

    #[tokio::test]
    async fn test_starts_in_guest_mode() {
        let client = guest_client();
        assert!(!client.is_cloud().await);
    }

    #[tokio::test]
    async fn test_guest_journal_roundtrip() {
        let client = guest_client();
        let entry = client.add_journal_entry(journal_draft()).await.unwrap();
        assert_eq!(entry.id, 1);

        let listed = client.journal_entries().await.unwrap();
        assert_eq!(listed, vec![entry.clone()]);

        client.delete_journal_entry(entry.id).await.unwrap();
        assert!(client.journal_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guest_session_feeds_growth_state() {
        let client = guest_client();
        let state = client.growth_state().await.unwrap();
        assert_eq!(state.phase, 0);

        client
            .record_session(SessionDraft {
                meditation_type: MeditationType::Breathing,
                duration_minutes: 30,
                soundscape: Soundscape::Rain,
                completed_at: T0,
            })
            .await
            .unwrap();

        let state = client.growth_state().await.unwrap();
        assert_eq!(state.phase, 1, "30 minutes crosses the first threshold");
    }

    #[tokio::test]
    async fn test_guest_domain_rules_surface_typed() {
        let client = guest_client();
        client.save_ritual(ritual_draft(15)).await.unwrap();

        let err = client.save_ritual(ritual_draft(15)).await.unwrap_err();
        assert!(
            matches!(err, SyncError::Domain(DomainError::DuplicateSoundscape)),
            "got {err:?}"
        );
        assert!(!err.retry_eligible());
        assert_eq!(client.rituals().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_guest_profile_contract() {
        let client = guest_client();
        assert_eq!(client.profile().await.unwrap(), None);

        let err = client
            .save_profile(UserProfile {
                name: "ana".into(),
                joined_at: T0,
                avatar: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Unauthorized(_)), "got {err:?}");

        let err = client.role().await.unwrap_err();
        assert!(matches!(err, SyncError::Unauthorized(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_guest_file_roundtrip_and_typed_codec_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let client = guest_client();
        client.add_journal_entry(journal_draft()).await.unwrap();
        client.export_to_file(&path).await.unwrap();

        let fresh = guest_client();
        let summary = fresh.import_from_file(&path).await.unwrap();
        assert_eq!(summary.journal_entries, 1);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ nope").unwrap();
        let err = fresh.import_from_file(&bad).await.unwrap_err();
        assert!(
            matches!(err, SyncError::Bundle(BundleError::InvalidJson(_))),
            "got {err:?}"
        );

        let wrong = dir.path().join("wrong.json");
        std::fs::write(&wrong, r#"{"version": "1.0"}"#).unwrap();
        let err = fresh.import_from_file(&wrong).await.unwrap_err();
        assert!(
            matches!(err, SyncError::Bundle(BundleError::InvalidStructure(_))),
            "got {err:?}"
        );

        // Failed imports applied nothing
        assert_eq!(fresh.journal_entries().await.unwrap().len(), 1);
    }
}
