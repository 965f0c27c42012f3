//! File-level import/export for the guest vault, using the versioned
//! JSON bundle as the interchange format.

use std::fs;
use std::path::Path;

use lotus_core::{ImportSummary, export_json, import_json};

use crate::error::{Result, StoreError};
use crate::vault::GuestVault;

impl GuestVault {
    /// Import a v1.0 JSON export file, replacing all guest data.
    pub fn import_json_file(&self, path: &Path) -> Result<ImportSummary> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
        })?;
        self.import_json_str(&json)
    }

    /// Import a v1.0 JSON string, replacing all guest data. Codec failures
    /// come back as [`StoreError::Bundle`] before anything is written.
    pub fn import_json_str(&self, json: &str) -> Result<ImportSummary> {
        let bundle = import_json(json)?;
        self.import_bundle(&bundle)
    }

    /// Export the vault contents to a v1.0 JSON file.
    pub fn export_json_file(&self, path: &Path) -> Result<()> {
        let json = self.export_json_string()?;
        fs::write(path, json).map_err(|e| {
            StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
        })
    }

    /// Export the vault contents as a v1.0 JSON string.
    pub fn export_json_string(&self) -> Result<String> {
        let bundle = self.export_bundle()?;
        export_json(&bundle)
            .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotus_core::{
        BundleError, MeditationType, RitualDraft, SessionDraft, Soundscape, import_json,
    };

    const T0: u64 = 1_771_632_000;

    fn seeded_vault() -> GuestVault {
        let vault = GuestVault::open_in_memory().unwrap();
        vault
            .record_session(SessionDraft {
                meditation_type: MeditationType::Breathing,
                duration_minutes: 15,
                soundscape: Soundscape::Rain,
                completed_at: T0,
            })
            .unwrap();
        vault
            .save_ritual(RitualDraft {
                name: "morning".into(),
                meditation_type: MeditationType::Breathing,
                duration_minutes: 15,
                soundscape: Soundscape::Rain,
                volume: 50,
                created_at: T0,
            })
            .unwrap();
        vault
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lotus-export.json");

        let source = seeded_vault();
        source.export_json_file(&path).unwrap();

        let target = GuestVault::open_in_memory().unwrap();
        let summary = target.import_json_file(&path).unwrap();
        assert_eq!(summary.sessions, 1);
        assert_eq!(summary.rituals, 1);

        assert_eq!(
            target.progress().unwrap(),
            source.progress().unwrap(),
            "progress must survive the file roundtrip"
        );
        assert_eq!(target.list_rituals().unwrap(), source.list_rituals().unwrap());
    }

    #[test]
    fn test_exported_string_is_a_versioned_bundle() {
        let json = seeded_vault().export_json_string().unwrap();
        let bundle = import_json(&json).unwrap();
        assert_eq!(bundle.progress.total_minutes, 15);
    }

    #[test]
    fn test_import_invalid_json_is_typed_and_applies_nothing() {
        let vault = seeded_vault();
        let err = vault.import_json_str("{ definitely not json").unwrap_err();
        assert!(
            matches!(err, StoreError::Bundle(BundleError::InvalidJson(_))),
            "got {err:?}"
        );
        // Existing data untouched
        assert_eq!(vault.progress().unwrap().total_minutes, 15);
    }

    #[test]
    fn test_import_wrong_structure_is_typed_and_applies_nothing() {
        let vault = seeded_vault();
        let err = vault.import_json_str(r#"{"version": "1.0"}"#).unwrap_err();
        assert!(
            matches!(err, StoreError::Bundle(BundleError::InvalidStructure(_))),
            "got {err:?}"
        );
        assert_eq!(vault.list_rituals().unwrap().len(), 1);
    }

    #[test]
    fn test_import_missing_file_is_invalid_data() {
        let vault = GuestVault::open_in_memory().unwrap();
        let err = vault
            .import_json_file(Path::new("/nonexistent/lotus.json"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)), "got {err:?}");
    }
}
