//! Settings persistence
//!
//! Saves and loads [`GameSettings`] to/from a JSON file.
//!
//! # File Location
//!
//! `settings.json` in the user's configuration directory, e.g.
//! `~/.config/chesstable/settings.json` on Linux. Falls back to a local
//! `settings.json` if no configuration directory can be resolved.
//!
//! # Error Handling
//!
//! - Load failures are returned; [`settings_or_default`] falls back to the
//!   defaults and hands the failure on to be logged
//! - Save failures are returned to the caller

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::info;

use crate::core::error::{CoreError, CoreResult};
use crate::core::GameSettings;

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Resolve the settings file path
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "ChessTable") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Load settings; a missing file gives the defaults
pub fn load_settings(path: &Path) -> CoreResult<GameSettings> {
    if !path.exists() {
        return Ok(GameSettings::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Settings to start with, plus any load failure
///
/// Runs before the subscriber exists, so the failure is handed back for the
/// caller to log once logging is up.
pub fn settings_or_default(path: &Path) -> (GameSettings, Option<CoreError>) {
    match load_settings(path) {
        Ok(settings) => (settings, None),
        Err(e) => (GameSettings::default(), Some(e)),
    }
}

/// Write settings, creating the parent directory if needed
pub fn save_settings(path: &Path, settings: &GameSettings) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chesstable-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = scratch_dir("missing");
        let (settings, error) = settings_or_default(&dir.join(SETTINGS_FILENAME));
        assert_eq!(settings, GameSettings::default());
        assert!(error.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("save");
        let path = dir.join("nested").join(SETTINGS_FILENAME);
        let settings = GameSettings {
            unicode_pieces: true,
            show_hints: false,
            log_filter: "chess_rules=debug".to_string(),
        };

        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_or_partial_files() {
        let dir = scratch_dir("invalid");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILENAME);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_settings(&path),
            Err(CoreError::SettingsSerialization(_))
        ));
        let (settings, error) = settings_or_default(&path);
        assert_eq!(settings, GameSettings::default());
        assert!(error.is_some(), "the parse failure is kept for logging");

        fs::write(&path, r#"{ "unicode_pieces": true }"#).unwrap();
        let settings = load_settings(&path).unwrap();
        assert!(settings.unicode_pieces);
        assert!(settings.show_hints, "missing fields keep their defaults");
        assert_eq!(settings.log_filter, "info");
        let _ = fs::remove_dir_all(&dir);
    }
}
