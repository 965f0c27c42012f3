//! JSON serde for the v1.0 export bundle.
//!
//! The bundle uses camelCase field names and stores every u64-valued field
//! (ids, timestamps, minute totals) as a decimal string, the way the remote
//! actor's bigint fields have to survive JSON. Small bounded counters
//! (durations, streak, volume) stay plain numbers. Sessions are hoisted out
//! of the progress aggregate into a top-level `sessionRecords` array. The
//! profile avatar never crosses this boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::records::{
    EnergyLevel, JournalEntry, MeditationType, Mood, ProgressStats, Ritual, SessionRecord,
    Soundscape, UserProfile,
};

pub const CURRENT_VERSION: &str = "1.0";

// --- Errors ---

/// Import failure. The two variants are deliberately distinct so callers
/// can tell "not JSON at all" apart from "JSON, but not a bundle".
#[derive(Debug)]
pub enum BundleError {
    InvalidJson(String),
    InvalidStructure(String),
}

impl fmt::Display for BundleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(msg) => write!(f, "not valid JSON: {msg}"),
            Self::InvalidStructure(msg) => write!(f, "not a valid export bundle: {msg}"),
        }
    }
}

impl std::error::Error for BundleError {}

// --- Domain bundle ---

/// Everything a user can carry between devices or storage substrates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportBundle {
    /// Unix seconds at export time. Informational only; import ignores it.
    pub exported_at: u64,
    pub journal_entries: Vec<JournalEntry>,
    pub progress: ProgressStats,
    pub rituals: Vec<Ritual>,
    pub profile: Option<UserProfile>,
}

/// What an import brought in, for reporting back to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub journal_entries: usize,
    pub sessions: usize,
    pub rituals: usize,
}

impl ImportSummary {
    pub fn of(bundle: &ExportBundle) -> Self {
        ImportSummary {
            journal_entries: bundle.journal_entries.len(),
            sessions: bundle.progress.sessions.len(),
            rituals: bundle.rituals.len(),
        }
    }
}

// --- Wire format types ---

#[derive(Serialize, Deserialize, Debug)]
pub struct WireBundle {
    pub version: String,
    #[serde(rename = "exportedAt", default)]
    pub exported_at: String,
    #[serde(rename = "journalEntries")]
    pub journal_entries: Vec<WireJournalEntry>,
    #[serde(rename = "sessionRecords")]
    pub session_records: Vec<WireSessionRecord>,
    #[serde(rename = "progressStats")]
    pub progress_stats: WireProgressStats,
    #[serde(rename = "userProfile", default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<WireUserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rituals: Option<Vec<WireRitual>>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireJournalEntry {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default)]
    pub energy: String,
    #[serde(default)]
    pub gratitude: Vec<String>,
    #[serde(default)]
    pub reflection: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireSessionRecord {
    pub id: String,
    #[serde(rename = "meditationType", default)]
    pub meditation_type: String,
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub soundscape: String,
    #[serde(rename = "completedAt")]
    pub completed_at: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireProgressStats {
    #[serde(rename = "totalMinutes")]
    pub total_minutes: String,
    #[serde(rename = "currentStreak")]
    pub current_streak: u32,
    #[serde(rename = "monthlyMinutes", default)]
    pub monthly_minutes: String,
    #[serde(rename = "lastSessionAt", default, skip_serializing_if = "Option::is_none")]
    pub last_session_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireRitual {
    pub id: String,
    pub name: String,
    #[serde(rename = "meditationType", default)]
    pub meditation_type: String,
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub soundscape: String,
    pub volume: u8,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Deliberately has no avatar field: raw image bytes are not JSON-safe and
/// are dropped on export.
#[derive(Serialize, Deserialize, Debug)]
pub struct WireUserProfile {
    pub name: String,
    #[serde(rename = "joinedAt")]
    pub joined_at: String,
}

// --- Conversion: Wire ↔ Domain ---
//
// The per-record conversions are public because the guest vault stores
// individual records in this same wire encoding.

impl WireBundle {
    /// Convert wire format to a domain bundle. Enum fields coerce lossily;
    /// malformed decimal strings are a structural error.
    pub fn into_bundle(self) -> Result<ExportBundle, BundleError> {
        let journal_entries = self
            .journal_entries
            .iter()
            .map(WireJournalEntry::to_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let sessions = self
            .session_records
            .iter()
            .map(WireSessionRecord::to_record)
            .collect::<Result<Vec<_>, _>>()?;

        let rituals = self
            .rituals
            .unwrap_or_default()
            .iter()
            .map(WireRitual::to_ritual)
            .collect::<Result<Vec<_>, _>>()?;

        let progress = self.progress_stats.to_stats(sessions)?;

        let profile = match &self.user_profile {
            Some(wire) => Some(wire.to_profile()?),
            None => None,
        };

        let exported_at = if self.exported_at.is_empty() {
            0
        } else {
            parse_u64("exportedAt", &self.exported_at)?
        };

        Ok(ExportBundle {
            exported_at,
            journal_entries,
            progress,
            rituals,
            profile,
        })
    }

    /// Create wire format from a domain bundle.
    pub fn from_bundle(bundle: &ExportBundle) -> Self {
        WireBundle {
            version: CURRENT_VERSION.to_string(),
            exported_at: bundle.exported_at.to_string(),
            journal_entries: bundle
                .journal_entries
                .iter()
                .map(WireJournalEntry::from_entry)
                .collect(),
            session_records: bundle
                .progress
                .sessions
                .iter()
                .map(WireSessionRecord::from_record)
                .collect(),
            progress_stats: WireProgressStats::from_stats(&bundle.progress),
            user_profile: bundle.profile.as_ref().map(WireUserProfile::from_profile),
            rituals: Some(bundle.rituals.iter().map(WireRitual::from_ritual).collect()),
        }
    }
}

fn parse_u64(field: &str, value: &str) -> Result<u64, BundleError> {
    value.trim().parse().map_err(|_| {
        BundleError::InvalidStructure(format!("{field} is not a decimal string: {value:?}"))
    })
}

impl WireJournalEntry {
    pub fn from_entry(entry: &JournalEntry) -> Self {
        WireJournalEntry {
            id: entry.id.to_string(),
            created_at: entry.created_at.to_string(),
            mood: entry.mood.map(|m| m.as_str().to_string()),
            energy: entry.energy.as_str().to_string(),
            gratitude: entry.gratitude.clone(),
            reflection: entry.reflection.clone(),
        }
    }

    pub fn to_entry(&self) -> Result<JournalEntry, BundleError> {
        Ok(JournalEntry {
            id: parse_u64("journalEntries[].id", &self.id)?,
            created_at: parse_u64("journalEntries[].createdAt", &self.created_at)?,
            // Unknown moods are dropped rather than guessed
            mood: self.mood.as_deref().and_then(Mood::from_str_opt),
            energy: EnergyLevel::from_str_lossy(&self.energy),
            gratitude: self.gratitude.clone(),
            reflection: self.reflection.clone(),
        })
    }
}

impl WireSessionRecord {
    pub fn from_record(session: &SessionRecord) -> Self {
        WireSessionRecord {
            id: session.id.to_string(),
            meditation_type: session.meditation_type.as_str().to_string(),
            duration_minutes: session.duration_minutes,
            soundscape: session.soundscape.as_str().to_string(),
            completed_at: session.completed_at.to_string(),
        }
    }

    pub fn to_record(&self) -> Result<SessionRecord, BundleError> {
        Ok(SessionRecord {
            id: parse_u64("sessionRecords[].id", &self.id)?,
            meditation_type: MeditationType::from_str_lossy(&self.meditation_type),
            duration_minutes: self.duration_minutes,
            soundscape: Soundscape::from_str_lossy(&self.soundscape),
            completed_at: parse_u64("sessionRecords[].completedAt", &self.completed_at)?,
        })
    }
}

impl WireRitual {
    pub fn from_ritual(ritual: &Ritual) -> Self {
        WireRitual {
            id: ritual.id.to_string(),
            name: ritual.name.clone(),
            meditation_type: ritual.meditation_type.as_str().to_string(),
            duration_minutes: ritual.duration_minutes,
            soundscape: ritual.soundscape.as_str().to_string(),
            volume: ritual.volume,
            created_at: ritual.created_at.to_string(),
        }
    }

    pub fn to_ritual(&self) -> Result<Ritual, BundleError> {
        Ok(Ritual {
            id: parse_u64("rituals[].id", &self.id)?,
            name: self.name.clone(),
            meditation_type: MeditationType::from_str_lossy(&self.meditation_type),
            duration_minutes: self.duration_minutes,
            soundscape: Soundscape::from_str_lossy(&self.soundscape),
            volume: self.volume,
            created_at: parse_u64("rituals[].createdAt", &self.created_at)?,
        })
    }
}

impl WireProgressStats {
    /// Sessions are carried separately; see the module doc on hoisting.
    pub fn from_stats(stats: &ProgressStats) -> Self {
        WireProgressStats {
            total_minutes: stats.total_minutes.to_string(),
            current_streak: stats.current_streak,
            monthly_minutes: stats.monthly_minutes.to_string(),
            last_session_at: stats.last_session_at.map(|t| t.to_string()),
        }
    }

    pub fn to_stats(&self, sessions: Vec<SessionRecord>) -> Result<ProgressStats, BundleError> {
        Ok(ProgressStats {
            total_minutes: parse_u64("progressStats.totalMinutes", &self.total_minutes)?,
            current_streak: self.current_streak,
            monthly_minutes: if self.monthly_minutes.is_empty() {
                0
            } else {
                parse_u64("progressStats.monthlyMinutes", &self.monthly_minutes)?
            },
            last_session_at: match &self.last_session_at {
                Some(s) => Some(parse_u64("progressStats.lastSessionAt", s)?),
                None => None,
            },
            sessions,
        })
    }
}

impl WireUserProfile {
    pub fn from_profile(profile: &UserProfile) -> Self {
        WireUserProfile {
            name: profile.name.clone(),
            joined_at: profile.joined_at.to_string(),
        }
    }

    pub fn to_profile(&self) -> Result<UserProfile, BundleError> {
        Ok(UserProfile {
            name: self.name.clone(),
            joined_at: parse_u64("userProfile.joinedAt", &self.joined_at)?,
            avatar: None,
        })
    }
}

// --- Import / Export ---

/// Deserialize a v1.0 JSON bundle.
///
/// Three gates, in order: the text must parse as JSON at all
/// ([`BundleError::InvalidJson`]), the value must look like a bundle
/// ([`BundleError::InvalidStructure`]), and decimal-string fields must
/// parse (also `InvalidStructure`). Nothing is applied anywhere on
/// failure; this function only builds a value.
pub fn import_json(json: &str) -> Result<ExportBundle, BundleError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| BundleError::InvalidJson(e.to_string()))?;

    validate_structure(&value)?;

    let wire: WireBundle = serde_json::from_value(value)
        .map_err(|e| BundleError::InvalidStructure(e.to_string()))?;
    wire.into_bundle()
}

/// Serialize a domain bundle to v1.0 JSON.
pub fn export_json(bundle: &ExportBundle) -> Result<String, serde_json::Error> {
    let wire = WireBundle::from_bundle(bundle);
    serde_json::to_string_pretty(&wire)
}

/// Shape check before the typed decode, so missing-top-level-field errors
/// read like "missing journalEntries" instead of a serde path dump.
fn validate_structure(value: &serde_json::Value) -> Result<(), BundleError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BundleError::InvalidStructure("top level is not an object".into()))?;

    let version = obj
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BundleError::InvalidStructure("missing version field".into()))?;
    if version != CURRENT_VERSION {
        return Err(BundleError::InvalidStructure(format!(
            "unsupported bundle version {version:?} (expected {CURRENT_VERSION:?})"
        )));
    }

    for field in ["journalEntries", "sessionRecords"] {
        if !obj.get(field).is_some_and(|v| v.is_array()) {
            return Err(BundleError::InvalidStructure(format!("missing {field} array")));
        }
    }
    if !obj.get("progressStats").is_some_and(|v| v.is_object()) {
        return Err(BundleError::InvalidStructure("missing progressStats object".into()));
    }

    Ok(())
}
