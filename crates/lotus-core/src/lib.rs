//! Lotus meditation companion core.
//!
//! Two responsibilities: derive the lotus bloom's visual state from
//! lifetime practice minutes, and model the domain records (journal,
//! sessions, rituals, progress) that the guest vault and the cloud sync
//! layer both persist — including the streak rules and the versioned
//! export bundle that moves data between them.
//!
//! Zero I/O — pure domain logic with no opinions about transport or persistence.

pub mod bundle;
pub mod constants;
pub mod growth;
pub mod progress;
pub mod records;
pub mod time;

pub use bundle::{
    BundleError, CURRENT_VERSION, ExportBundle, ImportSummary, export_json, import_json,
};
pub use constants::{GROWTH_CAP_MINUTES, LAYER_WINDOWS, MAX_RITUALS, PHASE_THRESHOLDS};
pub use growth::{GrowthState, compute_growth_state, smoothstep};
pub use records::{
    DomainError, EnergyLevel, JournalDraft, JournalEntry, MeditationType, Mood, ProgressStats,
    Ritual, RitualDraft, SessionDraft, SessionRecord, Soundscape, UserProfile, validate_new_ritual,
};
pub use time::{day_index, now_iso8601, now_unix_secs, unix_to_iso8601};
