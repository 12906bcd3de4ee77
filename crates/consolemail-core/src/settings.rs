//! Persisted client settings.
//!
//! Settings live in `settings.json` under the platform configuration
//! directory. A missing file means defaults; unknown fields are ignored and
//! missing fields take their default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Environment variable that overrides the settings file location.
pub const SETTINGS_ENV: &str = "CONSOLEMAIL_SETTINGS";

/// Most editable fields the address dialog supports.
pub const MAX_EDIT_FIELDS: u32 = 4;

/// What to do with input longer than its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Keep the longest prefix that fits.
    Truncate,
    /// Fail the operation.
    Reject,
}

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Provider library to load.
    pub library: String,
    /// Profile file holding the `[MAIL]` install marker.
    pub profile_file: String,
    /// Longest accepted line of operator input, in bytes.
    pub max_text_length: usize,
    /// Policy for over-long operator input.
    pub text_policy: LengthPolicy,
    /// Longest accepted attachment path, in bytes.
    pub max_path_length: usize,
    /// Policy for over-long attachment paths.
    pub path_policy: LengthPolicy,
    /// Most attachments one message may carry.
    pub max_attachments: usize,
    /// Editable fields in the address dialog (0..=4).
    pub address_edit_fields: u32,
    /// Address dialog caption.
    pub address_caption: String,
    /// Subject of sent messages.
    pub subject: String,
    /// Body of sent messages.
    pub note_text: String,
    /// Subject of messages saved by "create message".
    pub created_subject: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library: "MAPI32.DLL".to_string(),
            profile_file: "WIN.INI".to_string(),
            max_text_length: 256,
            text_policy: LengthPolicy::Truncate,
            max_path_length: 256,
            path_policy: LengthPolicy::Reject,
            max_attachments: 1,
            address_edit_fields: MAX_EDIT_FIELDS,
            address_caption: "Console Address List".to_string(),
            subject: "Any subject".to_string(),
            note_text: "Any note text".to_string(),
            created_subject: "A new message from consolemail".to_string(),
        }
    }
}

impl Settings {
    /// Location of the settings file.
    ///
    /// [`SETTINGS_ENV`] wins; otherwise `<config dir>/consolemail/settings.json`.
    #[must_use]
    pub fn path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("consolemail")
            .join("settings.json")
    }

    /// Loads settings from [`Settings::path`], writing the defaults there on
    /// first run.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read, parsed or validated.
    pub fn load() -> Result<Self> {
        Self::load_or_create(&Self::path())
    }

    /// Loads settings from `path`, or saves and returns the defaults when the
    /// file does not exist yet.
    ///
    /// A defaults file that cannot be written is logged and ignored.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read, parsed or validated.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }
        let settings = Self::default();
        if let Err(e) = settings.save_to(path) {
            warn!(?path, error = %e, "Could not write default settings");
        }
        Ok(settings)
    }

    /// Loads settings from `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(?path, "No settings file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&contents)?;
        settings.validate()?;
        debug!(?path, "Loaded settings");
        Ok(settings)
    }

    /// Writes settings to `path` as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails on I/O or serialization errors.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!(?path, "Settings saved");
        Ok(())
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.library.trim().is_empty() {
            return Err(Error::Config("library must not be empty".to_string()));
        }
        if self.address_edit_fields > MAX_EDIT_FIELDS {
            return Err(Error::Config(format!(
                "address_edit_fields must be between 0 and {MAX_EDIT_FIELDS}, got {}",
                self.address_edit_fields
            )));
        }
        if self.max_text_length == 0 {
            return Err(Error::Config("max_text_length must be positive".to_string()));
        }
        if self.max_path_length == 0 {
            return Err(Error::Config("max_path_length must be positive".to_string()));
        }
        if self.max_attachments == 0 {
            return Err(Error::Config("max_attachments must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("consolemail-settings-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.address_edit_fields, 4);
        assert_eq!(settings.max_attachments, 1);
        assert_eq!(settings.text_policy, LengthPolicy::Truncate);
        assert_eq!(settings.path_policy, LengthPolicy::Reject);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load_from(&scratch("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = scratch("partial.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "max_attachments": 3, "path_policy": "truncate" }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.max_attachments, 3);
        assert_eq!(settings.path_policy, LengthPolicy::Truncate);
        assert_eq!(settings.subject, "Any subject");
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("nested/saved.json");
        let settings = Settings {
            created_subject: "Draft".to_string(),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let path = scratch("first-run/settings.json");
        let _ = std::fs::remove_file(&path);

        let settings = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let path = scratch("kept/settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "subject": "Kept" }"#).unwrap();

        let settings = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings.subject, "Kept");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, r#"{ "subject": "Kept" }"#);
    }

    #[test]
    fn test_edit_fields_out_of_range() {
        let settings = Settings {
            address_edit_fields: 5,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let path = scratch("broken.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(Error::Settings(_))));
    }

    #[test]
    fn test_zero_attachments_rejected() {
        let settings = Settings {
            max_attachments: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
