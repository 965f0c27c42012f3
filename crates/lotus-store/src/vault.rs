//! The guest vault: local, signed-out storage.
//!
//! Data lives in a two-table SQLite file: a `metadata` key/value table
//! (schema version, id counter) and a `guest_records` table holding the
//! three logical sections of guest data as wire-format JSON strings.
//! Reads decode fresh from the stored strings on every call; nothing is
//! served from a retained in-memory view.

use std::path::Path;

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use lotus_core::bundle::{WireJournalEntry, WireProgressStats, WireRitual, WireSessionRecord};
use lotus_core::{
    BundleError, DomainError, ExportBundle, ImportSummary, JournalDraft, JournalEntry,
    ProgressStats, Ritual, RitualDraft, SessionDraft, SessionRecord, now_unix_secs,
    unix_to_iso8601, validate_new_ritual,
};

use crate::error::{Result, StoreError};
use crate::schema;

// Fixed keys in guest_records, one per logical section.
const KEY_JOURNAL: &str = "journal_entries";
const KEY_PROGRESS: &str = "progress_stats";
const KEY_RITUALS: &str = "rituals";

const NEXT_ID_KEY: &str = "next_record_id";

/// On-disk shape of the progress section: the wire aggregate with its
/// session list inline. Export bundles hoist sessions to the top level;
/// the vault keeps them with their counters.
#[derive(Serialize, Deserialize)]
struct StoredProgress {
    #[serde(flatten)]
    stats: WireProgressStats,
    #[serde(default)]
    sessions: Vec<WireSessionRecord>,
}

pub struct GuestVault {
    conn: Connection,
}

impl GuestVault {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        debug!(path = %path.display(), "opened guest vault");
        Ok(GuestVault { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(GuestVault { conn })
    }

    // --- Journal ---

    pub fn add_journal_entry(&self, draft: JournalDraft) -> Result<JournalEntry> {
        let tx = self.conn.unchecked_transaction()?;
        let id = next_record_id(&tx)?;
        let entry = draft.into_entry(id);

        let mut wires = load_journal(&tx)?;
        wires.push(WireJournalEntry::from_entry(&entry));
        store_section(&tx, KEY_JOURNAL, &wires)?;
        tx.commit()?;

        debug!(id, "journal entry added");
        Ok(entry)
    }

    /// Fresh decode on every call: ids and timestamps are reconstructed
    /// from their stored string form, never from a retained view.
    pub fn list_journal_entries(&self) -> Result<Vec<JournalEntry>> {
        load_journal(&self.conn)?
            .iter()
            .map(|w| w.to_entry().map_err(|e| corrupt(KEY_JOURNAL, e)))
            .collect()
    }

    /// Replace the entry with the same id. The id itself cannot change.
    pub fn update_journal_entry(&self, entry: &JournalEntry) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let mut wires = load_journal(&tx)?;
        let target = entry.id.to_string();
        let slot = wires
            .iter_mut()
            .find(|w| w.id == target)
            .ok_or(StoreError::Domain(DomainError::JournalEntryNotFound))?;
        *slot = WireJournalEntry::from_entry(entry);
        store_section(&tx, KEY_JOURNAL, &wires)?;
        tx.commit()?;
        Ok(())
    }

    pub fn delete_journal_entry(&self, id: u64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let mut wires = load_journal(&tx)?;
        let target = id.to_string();
        let before = wires.len();
        wires.retain(|w| w.id != target);
        if wires.len() == before {
            return Err(StoreError::Domain(DomainError::JournalEntryNotFound));
        }
        store_section(&tx, KEY_JOURNAL, &wires)?;
        tx.commit()?;
        debug!(id, "journal entry deleted");
        Ok(())
    }

    // --- Sessions / progress ---

    /// Record a completed session and fold it into the progress aggregate
    /// in one transaction: the session list, streak, and minute counters
    /// move together or not at all.
    pub fn record_session(&self, draft: SessionDraft) -> Result<SessionRecord> {
        let tx = self.conn.unchecked_transaction()?;
        let id = next_record_id(&tx)?;
        let record = draft.into_record(id);

        let mut progress = load_progress(&tx)?;
        progress.record_session(record.clone());
        store_progress(&tx, &progress)?;
        tx.commit()?;

        debug!(id, minutes = record.duration_minutes, "session recorded");
        Ok(record)
    }

    pub fn progress(&self) -> Result<ProgressStats> {
        load_progress(&self.conn)
    }

    // --- Rituals ---

    /// Admission checks and the insert run inside one transaction, so a
    /// concurrent writer cannot slip a duplicate in between check and save.
    pub fn save_ritual(&self, draft: RitualDraft) -> Result<Ritual> {
        let tx = self.conn.unchecked_transaction()?;
        let mut wires = load_rituals(&tx)?;
        let existing = wires
            .iter()
            .map(|w| w.to_ritual().map_err(|e| corrupt(KEY_RITUALS, e)))
            .collect::<Result<Vec<_>>>()?;

        let id = next_record_id(&tx)?;
        let ritual = draft.into_ritual(id);
        validate_new_ritual(&existing, &ritual)?;

        wires.push(WireRitual::from_ritual(&ritual));
        store_section(&tx, KEY_RITUALS, &wires)?;
        tx.commit()?;

        debug!(id, name = %ritual.name, "ritual saved");
        Ok(ritual)
    }

    pub fn list_rituals(&self) -> Result<Vec<Ritual>> {
        load_rituals(&self.conn)?
            .iter()
            .map(|w| w.to_ritual().map_err(|e| corrupt(KEY_RITUALS, e)))
            .collect()
    }

    pub fn delete_ritual(&self, id: u64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let mut wires = load_rituals(&tx)?;
        let target = id.to_string();
        let before = wires.len();
        wires.retain(|w| w.id != target);
        if wires.len() == before {
            return Err(StoreError::Domain(DomainError::RitualNotFound));
        }
        store_section(&tx, KEY_RITUALS, &wires)?;
        tx.commit()?;
        debug!(id, "ritual deleted");
        Ok(())
    }

    // --- Bundle ---

    pub fn export_bundle(&self) -> Result<ExportBundle> {
        Ok(ExportBundle {
            exported_at: now_unix_secs(),
            journal_entries: self.list_journal_entries()?,
            progress: self.progress()?,
            rituals: self.list_rituals()?,
            // Guest mode has no cloud profile to carry
            profile: None,
        })
    }

    /// Replace the entire guest dataset with the bundle's contents, in one
    /// transaction. On any failure the previous data is untouched.
    pub fn import_bundle(&self, bundle: &ExportBundle) -> Result<ImportSummary> {
        let tx = self.conn.unchecked_transaction()?;

        let journal: Vec<WireJournalEntry> = bundle
            .journal_entries
            .iter()
            .map(WireJournalEntry::from_entry)
            .collect();
        store_section(&tx, KEY_JOURNAL, &journal)?;
        store_progress(&tx, &bundle.progress)?;
        let rituals: Vec<WireRitual> =
            bundle.rituals.iter().map(WireRitual::from_ritual).collect();
        store_section(&tx, KEY_RITUALS, &rituals)?;

        // Restart the id counter above anything the bundle brought in
        let max_id = bundle
            .journal_entries
            .iter()
            .map(|e| e.id)
            .chain(bundle.progress.sessions.iter().map(|s| s.id))
            .chain(bundle.rituals.iter().map(|r| r.id))
            .max()
            .unwrap_or(0);
        set_metadata_on(&tx, NEXT_ID_KEY, &(max_id + 1).to_string())?;

        tx.commit()?;

        let summary = ImportSummary::of(bundle);
        debug!(
            journal = summary.journal_entries,
            sessions = summary.sessions,
            rituals = summary.rituals,
            "guest data replaced from bundle"
        );
        Ok(summary)
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        get_metadata_on(&self.conn, key)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        set_metadata_on(&self.conn, key, value)
    }
}

// Row-level helpers. All take &Connection so they run equally on the
// vault's connection or on an open transaction.

fn get_metadata_on(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = ?1")?;
    Ok(stmt.query_row([key], |row| row.get(0)).ok())
}

fn set_metadata_on(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

/// Allocate the next record id from the metadata counter. Runs on the
/// caller's transaction, so a rolled-back write rolls the counter back too.
fn next_record_id(conn: &Connection) -> Result<u64> {
    let current: u64 = match get_metadata_on(conn, NEXT_ID_KEY)? {
        Some(v) => v.parse().map_err(|_| {
            StoreError::InvalidData(format!("metadata {NEXT_ID_KEY} is not a number: {v:?}"))
        })?,
        None => 1,
    };
    set_metadata_on(conn, NEXT_ID_KEY, &(current + 1).to_string())?;
    Ok(current)
}

fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM guest_records WHERE key = ?1")?;
    Ok(stmt.query_row([key], |row| row.get(0)).ok())
}

fn store_section<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .map_err(|e| StoreError::InvalidData(format!("failed to encode {key}: {e}")))?;
    conn.execute(
        "INSERT OR REPLACE INTO guest_records (key, value, updated_at) VALUES (?1, ?2, ?3)",
        params![key, json, unix_to_iso8601(now_unix_secs())],
    )?;
    Ok(())
}

fn load_journal(conn: &Connection) -> Result<Vec<WireJournalEntry>> {
    match get_value(conn, KEY_JOURNAL)? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| StoreError::InvalidData(format!("corrupt {KEY_JOURNAL}: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn load_rituals(conn: &Connection) -> Result<Vec<WireRitual>> {
    match get_value(conn, KEY_RITUALS)? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| StoreError::InvalidData(format!("corrupt {KEY_RITUALS}: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn load_progress(conn: &Connection) -> Result<ProgressStats> {
    let stored: StoredProgress = match get_value(conn, KEY_PROGRESS)? {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| StoreError::InvalidData(format!("corrupt {KEY_PROGRESS}: {e}")))?,
        None => return Ok(ProgressStats::default()),
    };
    let sessions = stored
        .sessions
        .iter()
        .map(|w| w.to_record().map_err(|e| corrupt(KEY_PROGRESS, e)))
        .collect::<Result<Vec<_>>>()?;
    stored
        .stats
        .to_stats(sessions)
        .map_err(|e| corrupt(KEY_PROGRESS, e))
}

fn store_progress(conn: &Connection, progress: &ProgressStats) -> Result<()> {
    let stored = StoredProgress {
        stats: WireProgressStats::from_stats(progress),
        sessions: progress
            .sessions
            .iter()
            .map(WireSessionRecord::from_record)
            .collect(),
    };
    store_section(conn, KEY_PROGRESS, &stored)
}

fn corrupt(key: &str, e: BundleError) -> StoreError {
    StoreError::InvalidData(format!("corrupt {key}: {e}"))
}
