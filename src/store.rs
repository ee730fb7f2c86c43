//! Backup store maintenance: staged-archive relocation and retention pruning.
//!
//! Archives are always built in the temp directory and moved here with a
//! single rename once complete, so the store never holds a truncated archive
//! even if the process dies mid-build. Pruning re-derives the archive set
//! from a directory listing every run; nothing about the store is persisted
//! between runs.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::{BackupError, Result};
use crate::runlog::RunLog;

pub const ARCHIVE_PREFIX: &str = "backup_";
pub const ARCHIVE_SUFFIX: &str = ".7z";

/// Whether a file name follows the archive naming convention.
pub fn is_archive_name(name: &str) -> bool {
    name.starts_with(ARCHIVE_PREFIX) && name.ends_with(ARCHIVE_SUFFIX)
}

/// Move the completed archive from the temp path into the backup store.
///
/// One atomic rename: either the store gains the finished archive or it is
/// unchanged. On failure the staged archive stays in the temp directory for
/// manual recovery; deleting completed work over a transient move failure
/// would lose more than an orphan temp file costs.
pub fn relocate(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path).map_err(|source| BackupError::RelocationFailed {
        from: temp_path.to_path_buf(),
        to: final_path.to_path_buf(),
        source,
    })
}

/// What a pruning pass did.
#[derive(Debug, Default)]
pub struct PruneOutcome {
    /// Entries matching the archive naming convention.
    pub matched: usize,
    /// Archives actually deleted.
    pub deleted: usize,
    /// Per-file deletion failures. Never fatal to the run.
    pub failures: Vec<BackupError>,
}

/// Delete the oldest archives beyond `retain`.
///
/// Entries not matching the naming convention are ignored, never deleted.
/// Matched entries are ordered by modification time, oldest first, with the
/// file name as tie-break; exactly `matched - retain` are removed when the
/// count exceeds `retain`. A failed deletion is logged and the pass moves on
/// to the remaining candidates.
pub fn prune(backup_dir: &Path, retain: usize, log: &mut RunLog) -> Result<PruneOutcome> {
    let mut archives: Vec<(SystemTime, String)> = Vec::new();
    let entries = fs::read_dir(backup_dir).map_err(|source| {
        BackupError::io(
            format!("listing backup directory '{}'", backup_dir.display()),
            source,
        )
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| {
            BackupError::io(
                format!("listing backup directory '{}'", backup_dir.display()),
                source,
            )
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_archive_name(name) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .map_err(|source| {
                BackupError::io(
                    format!("reading modification time of '{}'", entry.path().display()),
                    source,
                )
            })?;
        archives.push((modified, name.to_string()));
    }

    let mut outcome = PruneOutcome {
        matched: archives.len(),
        ..PruneOutcome::default()
    };
    if archives.len() <= retain {
        return Ok(outcome);
    }

    archives.sort();
    let expired = archives.len() - retain;
    for (_, name) in archives.into_iter().take(expired) {
        log.line(&format!("removing expired backup: {name}"));
        let path = backup_dir.join(&name);
        match fs::remove_file(&path) {
            Ok(()) => outcome.deleted += 1,
            Err(source) => {
                let err = BackupError::PruneDeleteFailed { path, source };
                log.line(&err.to_string());
                outcome.failures.push(err);
            }
        }
    }
    Ok(outcome)
}
