//! Scheduled encrypted backup pipeline.
//!
//! coldvault archives a configured set of directories into a single
//! password-protected 7-Zip archive, moves the archive into a
//! retention-managed backup store, and deletes old archives beyond the
//! configured retention count. It is meant to be triggered by an OS
//! scheduler; it does no scheduling of its own.
//!
//! # Architecture
//!
//! ```text
//! config ──► provision ──► archive ──► store ──► notify
//!             (extract      (invoke    (rename,   (stub)
//!              bundled       7-Zip,     prune)
//!              7-Zip)        staged)
//! ```
//!
//! Two properties carry the design:
//!
//! - **Crash safety**: the archive is built in the temp directory and enters
//!   the backup store through a single rename, so the store never holds a
//!   partially written archive.
//! - **Failure classification**: provisioning, build, and relocation failures
//!   abort the run; pruning and notification failures are logged and the run
//!   still succeeds.
//!
//! The archiving itself is delegated to an external 7-Zip executable,
//! provisioned per run from a platform-keyed asset bundle and invoked under a
//! fixed flag set (store-only, encrypted header, timestamps and attributes
//! preserved). The loaded configuration is passed by reference into each
//! component; there is no process-wide state.

pub mod archive;
pub mod config;
pub mod error;
pub mod id;
pub mod notify;
pub mod pipeline;
pub mod provision;
pub mod runlog;
pub mod store;

pub use config::{BackupConfig, EmailConfig};
pub use error::{BackupError, Result};
pub use notify::{Notifier, RunReport, StatusEmailNotifier};
pub use pipeline::{run, ArchiveJob};
pub use provision::{Platform, ProvisionedTool, ToolBundle};
pub use runlog::RunLog;
