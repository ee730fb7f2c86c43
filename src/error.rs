//! Error types for the backup pipeline.
//!
//! Fatal vs. non-fatal classification is a property of where an error occurs
//! in the run, not of the variant itself: the pipeline aborts on provisioning,
//! build, and relocation failures and records pruning/notification failures
//! without changing the run outcome.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Main result type for backup operations.
pub type Result<T> = std::result::Result<T, BackupError>;

#[derive(Debug, Error)]
pub enum BackupError {
    /// Missing, malformed, or invalid configuration. Fatal before the run starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// No archiver payload is bundled for the platform.
    #[error("unsupported platform '{0}': no archiver payload bundled")]
    UnsupportedPlatform(String),

    /// The quarantine marking on the extracted tool could not be cleared.
    /// Left in place it would make the unattended invocation prompt or fail.
    #[error("clearing quarantine attribute on '{}': {detail}", .path.display())]
    AttributeClearFailed { path: PathBuf, detail: String },

    /// The OS entropy source failed while generating a run identifier.
    #[error("random source failure while generating run identifier")]
    RandomSource(#[source] rand::Error),

    /// The archiving tool exited with a non-zero status.
    #[error("archive tool failed with {status}:\n{output}")]
    ArchiveToolFailed { status: ExitStatus, output: String },

    /// Moving the staged archive into the backup store failed. The staged
    /// archive is left in the temp directory for manual recovery.
    #[error("relocating archive '{}' -> '{}': {source}", .from.display(), .to.display())]
    RelocationFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An expired backup slated for deletion could not be removed.
    #[error("deleting expired backup '{}': {source}", .path.display())]
    PruneDeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The notifier could not deliver the run report.
    #[error("notification failed: {0}")]
    NotifyFailed(String),

    /// Filesystem failure outside the named cases above.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl BackupError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
