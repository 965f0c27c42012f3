//! Data-directory resolution and vault opening.
//!
//! One vault per user, not per project. Priority chain for the base
//! directory: explicit override (CLI flag), then the `LOTUS_DATA_DIR`
//! environment variable, then `~/.lotus`.

use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::{Result, StoreError};
use crate::vault::GuestVault;

pub const DATA_DIR_ENV: &str = "LOTUS_DATA_DIR";

/// Default base directory for all lotus storage.
fn default_base_dir() -> PathBuf {
    dirs_home().join(".lotus")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve the base data directory from the priority chain.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Ok(dir) = env::var(DATA_DIR_ENV)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    default_base_dir()
}

pub fn vault_path(base: &Path) -> PathBuf {
    base.join("guest.db")
}

pub fn config_path(base: &Path) -> PathBuf {
    base.join("config.toml")
}

/// Open the guest vault under `base`, creating the directory as needed.
pub fn open_vault(base: &Path) -> Result<GuestVault> {
    fs::create_dir_all(base)
        .map_err(|e| StoreError::InvalidData(format!("failed to create {}: {e}", base.display())))?;
    GuestVault::open(&vault_path(base))
}
