//! Run-outcome notification boundary.
//!
//! The pipeline makes exactly one call here at the end of a run; delivery
//! failure never changes the run outcome.

use std::path::PathBuf;

use crate::config::EmailConfig;
use crate::error::{BackupError, Result};

/// Outcome of one pipeline run, handed to the notifier.
#[derive(Debug)]
pub struct RunReport {
    /// The archive produced by this run, at its final store path.
    pub archive_path: PathBuf,
    /// Archives deleted by the retention pass.
    pub pruned: usize,
    /// Non-fatal problems recorded during the run.
    pub notes: Vec<String>,
}

pub trait Notifier {
    fn notify(&self, report: &RunReport) -> Result<()>;
}

/// Status email delivery. Not yet implemented; `notify` always fails and the
/// pipeline logs the failure without affecting the run.
pub struct StatusEmailNotifier {
    #[allow(dead_code)]
    email: Option<EmailConfig>,
}

impl StatusEmailNotifier {
    pub fn new(email: Option<EmailConfig>) -> StatusEmailNotifier {
        StatusEmailNotifier { email }
    }
}

impl Notifier for StatusEmailNotifier {
    fn notify(&self, _report: &RunReport) -> Result<()> {
        Err(BackupError::NotifyFailed(
            "sending status emails is not yet implemented".to_string(),
        ))
    }
}
