//! Pipeline orchestration.
//!
//! One run walks Provisioning → Building → Relocating → Pruning → Notifying.
//! Failures in the first three stages abort the run; pruning and notification
//! failures are recorded in the report and the run still succeeds, because the
//! archive itself is already safely in the store by then. The provisioned
//! tool is released on every exit path via its drop guard.
//!
//! The pipeline assumes exactly one run at a time against a given backup and
//! temp directory; serializing invocations is the scheduler's job.

use std::path::PathBuf;

use time::OffsetDateTime;

use crate::archive;
use crate::config::BackupConfig;
use crate::error::Result;
use crate::id::generate_id;
use crate::notify::{Notifier, RunReport};
use crate::provision::{Platform, ToolBundle};
use crate::runlog::RunLog;
use crate::store::{self, ARCHIVE_PREFIX, ARCHIVE_SUFFIX};

pub const ID_LENGTH: usize = 6;

/// One pipeline run: identifier plus the staged and final archive paths.
/// Lives for the duration of the run only; no job record is persisted.
#[derive(Debug)]
pub struct ArchiveJob {
    pub id: String,
    pub file_name: String,
    pub temp_path: PathBuf,
    pub final_path: PathBuf,
}

impl ArchiveJob {
    pub fn new(config: &BackupConfig) -> Result<ArchiveJob> {
        let id = generate_id(ID_LENGTH)?;
        let file_name = format!("{}{}_{}{}", ARCHIVE_PREFIX, date_stamp(), id, ARCHIVE_SUFFIX);
        Ok(ArchiveJob {
            temp_path: config.temp_dir.join(&file_name),
            final_path: config.backup_dir.join(&file_name),
            id,
            file_name,
        })
    }
}

fn date_stamp() -> String {
    let now = OffsetDateTime::now_utc();
    format!("{:04}-{:02}-{:02}", now.year(), now.month() as u8, now.day())
}

/// Execute one backup run end to end.
pub fn run(
    config: &BackupConfig,
    bundle: &ToolBundle,
    notifier: &dyn Notifier,
    log: &mut RunLog,
) -> Result<RunReport> {
    log.line("backup run starting");

    let job = ArchiveJob::new(config)?;
    log.line(&format!(
        "creating archive at temporary path: {}",
        job.temp_path.display()
    ));

    let platform = Platform::current()?;
    let tool = bundle.provision(&config.temp_dir, platform)?;
    let built = archive::build(
        &tool,
        &config.directories,
        &job.temp_path,
        &config.password,
        log,
    );
    // Release the extracted tool before touching the store; the drop guard
    // also covers the early returns above and below.
    drop(tool);
    built?;

    log.line(&format!(
        "moving archive to final destination: {}",
        job.final_path.display()
    ));
    store::relocate(&job.temp_path, &job.final_path)?;

    let mut report = RunReport {
        archive_path: job.final_path.clone(),
        pruned: 0,
        notes: Vec::new(),
    };

    match store::prune(&config.backup_dir, config.retain_recent_backups, log) {
        Ok(outcome) => {
            report.pruned = outcome.deleted;
            report
                .notes
                .extend(outcome.failures.iter().map(|err| err.to_string()));
        }
        Err(err) => {
            log.line(&format!("failed to clean up old backups: {err}"));
            report.notes.push(err.to_string());
        }
    }

    if let Err(err) = notifier.notify(&report) {
        log.line(&err.to_string());
        report.notes.push(err.to_string());
    }

    log.line("backup run completed successfully");
    Ok(report)
}
