//! Domain records shared by the guest vault and the cloud sync layer.
//!
//! Both storage substrates persist the same logical shapes; only the
//! encoding differs. Lossy decoding rules live on the enums so import and
//! storage hydration degrade the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_RITUALS;

/// Guided practice style for a session or ritual.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MeditationType {
    /// Default and fallback for unrecognized stored values.
    #[default]
    Mindfulness,
    Breathing,
    BodyScan,
    LovingKindness,
    Visualization,
}

impl MeditationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mindfulness => "mindfulness",
            Self::Breathing => "breathing",
            Self::BodyScan => "body-scan",
            Self::LovingKindness => "loving-kindness",
            Self::Visualization => "visualization",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "mindfulness" => Some(Self::Mindfulness),
            "breathing" => Some(Self::Breathing),
            "body-scan" => Some(Self::BodyScan),
            "loving-kindness" => Some(Self::LovingKindness),
            "visualization" => Some(Self::Visualization),
            _ => None,
        }
    }

    /// Unrecognized stored values coerce to the default.
    pub fn from_str_lossy(s: &str) -> Self {
        Self::from_str_opt(s).unwrap_or_default()
    }
}

/// Ambient sound played during a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Soundscape {
    /// Default and fallback for unrecognized stored values.
    #[default]
    Silence,
    Rain,
    Ocean,
    Forest,
    Temple,
    Bells,
}

impl Soundscape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silence => "silence",
            Self::Rain => "rain",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::Temple => "temple",
            Self::Bells => "bells",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "silence" => Some(Self::Silence),
            "rain" => Some(Self::Rain),
            "ocean" => Some(Self::Ocean),
            "forest" => Some(Self::Forest),
            "temple" => Some(Self::Temple),
            "bells" => Some(Self::Bells),
            _ => None,
        }
    }

    /// Unrecognized stored values coerce to the default.
    pub fn from_str_lossy(s: &str) -> Self {
        Self::from_str_opt(s).unwrap_or_default()
    }
}

/// Journaled mood. Unknown stored values are dropped, not coerced, so a
/// journal entry never shows a mood the user did not pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    Grateful,
    Anxious,
    Tired,
    Joyful,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Grateful => "grateful",
            Self::Anxious => "anxious",
            Self::Tired => "tired",
            Self::Joyful => "joyful",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "calm" => Some(Self::Calm),
            "grateful" => Some(Self::Grateful),
            "anxious" => Some(Self::Anxious),
            "tired" => Some(Self::Tired),
            "joyful" => Some(Self::Joyful),
            _ => None,
        }
    }
}

/// Journaled energy level. Unknown stored values coerce to [`Self::Balanced`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    #[default]
    Balanced,
    High,
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Balanced => "balanced",
            Self::High => "high",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "balanced" => Some(Self::Balanced),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Unrecognized stored values coerce to the default.
    pub fn from_str_lossy(s: &str) -> Self {
        Self::from_str_opt(s).unwrap_or_default()
    }
}

/// One journal entry, written after (or independently of) a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    /// Unix seconds, UTC.
    pub created_at: u64,
    pub mood: Option<Mood>,
    #[serde(default)]
    pub energy: EnergyLevel,
    #[serde(default)]
    pub gratitude: Vec<String>,
    pub reflection: String,
}

/// A journal entry not yet admitted to a store. The storing substrate
/// (guest vault or remote actor) assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalDraft {
    /// Unix seconds, UTC.
    pub created_at: u64,
    pub mood: Option<Mood>,
    #[serde(default)]
    pub energy: EnergyLevel,
    #[serde(default)]
    pub gratitude: Vec<String>,
    pub reflection: String,
}

impl JournalDraft {
    pub fn into_entry(self, id: u64) -> JournalEntry {
        JournalEntry {
            id,
            created_at: self.created_at,
            mood: self.mood,
            energy: self.energy,
            gratitude: self.gratitude,
            reflection: self.reflection,
        }
    }
}

/// One completed meditation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: u64,
    #[serde(default)]
    pub meditation_type: MeditationType,
    pub duration_minutes: u32,
    #[serde(default)]
    pub soundscape: Soundscape,
    /// Unix seconds, UTC.
    pub completed_at: u64,
}

/// A completed session awaiting an id from a store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionDraft {
    #[serde(default)]
    pub meditation_type: MeditationType,
    pub duration_minutes: u32,
    #[serde(default)]
    pub soundscape: Soundscape,
    /// Unix seconds, UTC.
    pub completed_at: u64,
}

impl SessionDraft {
    pub fn into_record(self, id: u64) -> SessionRecord {
        SessionRecord {
            id,
            meditation_type: self.meditation_type,
            duration_minutes: self.duration_minutes,
            soundscape: self.soundscape,
            completed_at: self.completed_at,
        }
    }
}

/// Lifetime practice aggregate. `sessions` carries the full history; the
/// counters are maintained incrementally by [`record_session`] so reads
/// never rescan the list.
///
/// [`record_session`]: ProgressStats::record_session
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_minutes: u64,
    pub current_streak: u32,
    pub monthly_minutes: u64,
    /// Unix seconds of the most recent session, if any.
    pub last_session_at: Option<u64>,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

/// A saved preset: practice style, duration, and ambience for one-tap reuse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ritual {
    pub id: u64,
    pub name: String,
    pub meditation_type: MeditationType,
    pub duration_minutes: u32,
    pub soundscape: Soundscape,
    /// Ambience volume, 0–100.
    pub volume: u8,
    /// Unix seconds, UTC.
    pub created_at: u64,
}

impl Ritual {
    /// Two rituals collide when their playable configuration matches; the
    /// display name is not part of the identity.
    pub fn same_config(&self, other: &Ritual) -> bool {
        self.meditation_type == other.meditation_type
            && self.duration_minutes == other.duration_minutes
            && self.soundscape == other.soundscape
            && self.volume == other.volume
    }
}

/// A ritual awaiting admission. Validation runs against the completed
/// [`Ritual`], so the id is assigned before [`validate_new_ritual`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RitualDraft {
    pub name: String,
    #[serde(default)]
    pub meditation_type: MeditationType,
    pub duration_minutes: u32,
    #[serde(default)]
    pub soundscape: Soundscape,
    pub volume: u8,
    /// Unix seconds, UTC.
    pub created_at: u64,
}

impl RitualDraft {
    pub fn into_ritual(self, id: u64) -> Ritual {
        Ritual {
            id,
            name: self.name,
            meditation_type: self.meditation_type,
            duration_minutes: self.duration_minutes,
            soundscape: self.soundscape,
            volume: self.volume,
            created_at: self.created_at,
        }
    }
}

/// Account profile. The avatar is raw image bytes and never crosses the
/// export boundary (JSON bundles drop it).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    /// Unix seconds, UTC.
    pub joined_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Vec<u8>>,
}

/// Business-rule rejection. Never retried; each variant maps to one
/// user-facing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainError {
    /// A ritual with the same configuration already exists.
    DuplicateSoundscape,
    /// The per-user ritual cap is already full.
    RitualLimitExceeded,
    RitualNotFound,
    JournalEntryNotFound,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSoundscape => {
                write!(f, "a ritual with this exact configuration already exists")
            }
            Self::RitualLimitExceeded => {
                write!(f, "ritual limit reached ({MAX_RITUALS} saved rituals)")
            }
            Self::RitualNotFound => write!(f, "ritual not found"),
            Self::JournalEntryNotFound => write!(f, "journal entry not found"),
        }
    }
}

impl std::error::Error for DomainError {}

/// Admission check for saving a new ritual against the current list.
/// Callers must run this and the subsequent insert as one atomic unit;
/// checking here and inserting later re-opens the race this rule closes.
pub fn validate_new_ritual(existing: &[Ritual], candidate: &Ritual) -> Result<(), DomainError> {
    if existing.iter().any(|r| r.same_config(candidate)) {
        return Err(DomainError::DuplicateSoundscape);
    }
    if existing.len() >= MAX_RITUALS {
        return Err(DomainError::RitualLimitExceeded);
    }
    Ok(())
}
