//! Run log sink.
//!
//! Every pipeline event and all captured subprocess output is appended to a
//! log file inside the backup directory. In debug mode the same content is
//! mirrored to stdout. The sink is passed by value into the components that
//! log, so nothing writes through ambient global state.
//!
//! Write failures on the sink are swallowed: a broken log must not fail a
//! backup that is otherwise succeeding.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::error::{BackupError, Result};

pub struct RunLog {
    file: File,
    path: PathBuf,
    mirror: bool,
}

impl RunLog {
    /// Open (append-create) the run log inside the backup directory.
    ///
    /// With `mirror` set, every line and raw write is echoed to stdout.
    pub fn open(backup_dir: &Path, file_name: &str, mirror: bool) -> Result<RunLog> {
        let path = backup_dir.join(file_name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| {
                BackupError::io(format!("opening run log '{}'", path.display()), source)
            })?;
        Ok(RunLog { file, path, mirror })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped line.
    pub fn line(&mut self, msg: &str) {
        let stamped = format!("[{}] {}\n", timestamp_utc(), msg);
        let _ = self.file.write_all(stamped.as_bytes());
        if self.mirror {
            print!("{stamped}");
        }
    }

    /// Append captured subprocess output verbatim.
    pub fn raw(&mut self, bytes: &[u8]) {
        let _ = self.file.write_all(bytes);
        if self.mirror {
            let _ = io::stdout().write_all(bytes);
        }
    }
}

fn timestamp_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lines_are_timestamped_and_appended() {
        let temp = TempDir::new().unwrap();
        let mut log = RunLog::open(temp.path(), "backup.log", false).unwrap();
        log.line("first");
        log.line("second");
        drop(log);

        let body = fs::read_to_string(temp.path().join("backup.log")).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['), "missing timestamp: {}", lines[0]);
        assert!(lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] second"));
        // [YYYY-MM-DD HH:MM:SS] is 21 characters.
        assert_eq!(&lines[0][21..22], " ");
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let temp = TempDir::new().unwrap();
        {
            let mut log = RunLog::open(temp.path(), "backup.log", false).unwrap();
            log.line("run one");
        }
        {
            let mut log = RunLog::open(temp.path(), "backup.log", false).unwrap();
            log.line("run two");
        }
        let body = fs::read_to_string(temp.path().join("backup.log")).unwrap();
        assert!(body.contains("run one"));
        assert!(body.contains("run two"));
    }

    #[test]
    fn raw_writes_pass_through_unstamped() {
        let temp = TempDir::new().unwrap();
        let mut log = RunLog::open(temp.path(), "backup.log", false).unwrap();
        log.raw(b"tool output\n");
        drop(log);
        let body = fs::read_to_string(temp.path().join("backup.log")).unwrap();
        assert_eq!(body, "tool output\n");
    }
}
