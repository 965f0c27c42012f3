//! Read cache for cloud mode.
//!
//! Guest reads never touch this: the vault is local and always fresh.
//! Cloud reads populate a slot per resource; any mutation invalidates
//! the slot it touched, and sign-in/out clears everything.

use tokio::sync::RwLock;

use lotus_core::{JournalEntry, ProgressStats, Ritual};

/// Cacheable resource groups. Session records travel inside the progress
/// aggregate, so invalidating `Progress` covers them too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Journal,
    Progress,
    Rituals,
}

#[derive(Default)]
struct Slots {
    journal: Option<Vec<JournalEntry>>,
    progress: Option<ProgressStats>,
    rituals: Option<Vec<Ritual>>,
}

#[derive(Default)]
pub struct QueryCache {
    slots: RwLock<Slots>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn journal(&self) -> Option<Vec<JournalEntry>> {
        self.slots.read().await.journal.clone()
    }

    pub async fn store_journal(&self, entries: Vec<JournalEntry>) {
        self.slots.write().await.journal = Some(entries);
    }

    pub async fn progress(&self) -> Option<ProgressStats> {
        self.slots.read().await.progress.clone()
    }

    pub async fn store_progress(&self, progress: ProgressStats) {
        self.slots.write().await.progress = Some(progress);
    }

    pub async fn rituals(&self) -> Option<Vec<Ritual>> {
        self.slots.read().await.rituals.clone()
    }

    pub async fn store_rituals(&self, rituals: Vec<Ritual>) {
        self.slots.write().await.rituals = Some(rituals);
    }

    pub async fn invalidate(&self, resource: Resource) {
        let mut slots = self.slots.write().await;
        match resource {
            Resource::Journal => slots.journal = None,
            Resource::Progress => slots.progress = None,
            Resource::Rituals => slots.rituals = None,
        }
    }

    pub async fn clear(&self) {
        *self.slots.write().await = Slots::default();
    }
}
