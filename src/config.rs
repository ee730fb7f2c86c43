//! Backup configuration loading and validation.
//!
//! The configuration is a single JSON file loaded once at startup. A missing
//! or malformed file is fatal; there is no partial or default operation. The
//! loaded value is passed by reference into each component — no process-wide
//! configuration state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BackupError, Result};

fn default_log_file_name() -> String {
    "backup.log".to_string()
}

/// Settings for the unimplemented status email notifier.
///
/// Accepted and carried so existing configuration files keep loading; no
/// transport consumes them yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    pub recipient: String,
    pub sender: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_auth_enabled: bool,
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Source directories to archive, in order.
    pub directories: Vec<PathBuf>,
    /// Retention-managed backup store. Also holds the run log.
    pub backup_dir: PathBuf,
    /// Staging area for the archive and the extracted tool.
    pub temp_dir: PathBuf,
    /// Archive password. Passed to the tool as an opaque credential and never
    /// written to the log.
    pub password: String,
    /// Keep at most this many most recent archives after a successful run.
    pub retain_recent_backups: usize,
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
    #[serde(default)]
    pub debug_mode: bool,
    /// Directory holding the per-platform archiver payloads. Defaults to
    /// `tool-assets/` next to the executable.
    #[serde(default)]
    pub tool_bundle_dir: Option<PathBuf>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

impl BackupConfig {
    /// Load and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<BackupConfig> {
        let bytes = fs::read_to_string(path).map_err(|err| {
            BackupError::Config(format!("reading '{}': {}", path.display(), err))
        })?;
        let config: BackupConfig = serde_json::from_str(&bytes).map_err(|err| {
            BackupError::Config(format!("parsing '{}': {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.directories.is_empty() {
            return Err(BackupError::Config(
                "'directories' must list at least one source directory".to_string(),
            ));
        }
        if self.backup_dir == self.temp_dir {
            return Err(BackupError::Config(format!(
                "'backup_dir' and 'temp_dir' must be distinct paths, both are '{}'",
                self.backup_dir.display()
            )));
        }
        if self.log_file_name.is_empty() {
            return Err(BackupError::Config(
                "'log_file_name' must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
