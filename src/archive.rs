//! Archive creation via the provisioned 7-Zip tool.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{BackupError, Result};
use crate::provision::ProvisionedTool;
use crate::runlog::RunLog;

/// Argument list for one archive build.
///
/// The flag set is fixed and security-relevant:
///
/// - `a`        add to archive
/// - `-mx=0`    store only, no compression (speed over size)
/// - `-mhe=on`  encrypt the archive header so the file listing needs the password
/// - `-mtm=on`  keep modified timestamps
/// - `-mtc=on`  keep created timestamps
/// - `-mta=on`  keep accessed timestamps
/// - `-mtr=on`  keep file attributes
pub fn tool_args(sources: &[PathBuf], output: &Path, password: &str) -> Vec<String> {
    let mut args = vec![
        "a".to_string(),
        "-mx=0".to_string(),
        "-mhe=on".to_string(),
        "-mtm=on".to_string(),
        "-mtc=on".to_string(),
        "-mta=on".to_string(),
        "-mtr=on".to_string(),
        format!("-p{password}"),
        output.display().to_string(),
    ];
    args.extend(sources.iter().map(|dir| dir.display().to_string()));
    args
}

/// Run the provisioned tool against `sources`, producing `output`.
///
/// `output` must point inside the temp directory; moving the finished archive
/// into the backup store is the relocator's job. All tool output is captured
/// and written to the log sink. The password reaches the tool only through
/// its argument vector and is never logged.
pub fn build(
    tool: &ProvisionedTool,
    sources: &[PathBuf],
    output: &Path,
    password: &str,
    log: &mut RunLog,
) -> Result<()> {
    log.line(&format!("starting archive build: {}", output.display()));

    let captured = Command::new(tool.path())
        .args(tool_args(sources, output, password))
        .output()
        .map_err(|source| {
            BackupError::io(
                format!("invoking archive tool '{}'", tool.path().display()),
                source,
            )
        })?;

    log.raw(&captured.stdout);
    log.raw(&captured.stderr);

    if !captured.status.success() {
        log.line(&format!("archive tool exited with {}", captured.status));
        let mut output_text = String::from_utf8_lossy(&captured.stdout).into_owned();
        output_text.push_str(&String::from_utf8_lossy(&captured.stderr));
        return Err(BackupError::ArchiveToolFailed {
            status: captured.status,
            output: output_text,
        });
    }

    log.line("archive build finished");
    Ok(())
}
