//! Archiver tool provisioning.
//!
//! The 7-Zip executable is not assumed to exist on the host. Each run extracts
//! the payload matching the current platform from an install-time asset bundle
//! into the temp directory, marks it executable, and deletes it when the run
//! ends. The bundle is an explicit platform → file-name lookup table resolved
//! against a payload directory, so adding a platform means adding a table
//! entry and shipping the payload, not recompiling with new embeds.
//!
//! On macOS the extracted binary carries the quarantine attribute of its
//! bundle; an un-clearable quarantine flag would make the later unattended
//! invocation prompt or fail, so a failed clear is fatal.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{BackupError, Result};

/// Directory of archiver payloads, resolved next to the executable by default.
pub const DEFAULT_BUNDLE_DIR: &str = "tool-assets";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// Identify the platform this process is running on.
    pub fn current() -> Result<Platform> {
        match env::consts::OS {
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            other => Err(BackupError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
        }
    }
}

/// Platform-keyed archiver payload bundle.
pub struct ToolBundle {
    dir: PathBuf,
    payloads: Vec<(Platform, String)>,
}

impl ToolBundle {
    /// Bundle with the stock payload table: `7zz` for macOS, `7za.exe` for
    /// Windows. No Linux payload ships, so provisioning there fails with
    /// `UnsupportedPlatform`.
    pub fn new(dir: PathBuf) -> ToolBundle {
        ToolBundle {
            dir,
            payloads: vec![
                (Platform::MacOs, "7zz".to_string()),
                (Platform::Windows, "7za.exe".to_string()),
            ],
        }
    }

    /// Bundle with an explicit payload table.
    pub fn with_payloads(dir: PathBuf, payloads: Vec<(Platform, String)>) -> ToolBundle {
        ToolBundle { dir, payloads }
    }

    /// Default payload directory: `tool-assets/` next to the executable.
    pub fn default_dir() -> Result<PathBuf> {
        let exe = env::current_exe()
            .map_err(|source| BackupError::io("resolving executable path", source))?;
        let parent = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(parent.join(DEFAULT_BUNDLE_DIR))
    }

    fn payload_name(&self, platform: Platform) -> Option<&str> {
        self.payloads
            .iter()
            .find(|(candidate, _)| *candidate == platform)
            .map(|(_, name)| name.as_str())
    }

    /// Extract the payload for `platform` into `temp_dir` as an executable.
    ///
    /// The returned guard deletes the extracted file when dropped, so the
    /// tool's lifetime is bracketed by the run whatever the exit path.
    pub fn provision(&self, temp_dir: &Path, platform: Platform) -> Result<ProvisionedTool> {
        let file_name = self
            .payload_name(platform)
            .ok_or_else(|| BackupError::UnsupportedPlatform(platform.name().to_string()))?;

        let payload_path = self.dir.join(file_name);
        let bytes = fs::read(&payload_path).map_err(|source| {
            BackupError::io(
                format!("reading archiver payload '{}'", payload_path.display()),
                source,
            )
        })?;

        let output_path = temp_dir.join(file_name);
        fs::write(&output_path, &bytes).map_err(|source| {
            BackupError::io(
                format!("writing archiver binary '{}'", output_path.display()),
                source,
            )
        })?;
        make_executable(&output_path)?;
        let tool = ProvisionedTool { path: output_path };

        if platform == Platform::MacOs {
            clear_quarantine(&tool.path)?;
        }

        Ok(tool)
    }
}

/// Extracted archiver binary, deleted on drop.
pub struct ProvisionedTool {
    path: PathBuf,
}

impl ProvisionedTool {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProvisionedTool {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
        BackupError::io(
            format!("setting executable permission on '{}'", path.display()),
            source,
        )
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn clear_quarantine(path: &Path) -> Result<()> {
    let output = Command::new("xattr")
        .args(["-d", "com.apple.quarantine"])
        .arg(path)
        .output()
        .map_err(|err| BackupError::AttributeClearFailed {
            path: path.to_path_buf(),
            detail: err.to_string(),
        })?;

    if !output.status.success() {
        return Err(BackupError::AttributeClearFailed {
            path: path.to_path_buf(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bundle_with_linux_payload(dir: &Path, body: &[u8]) -> ToolBundle {
        fs::write(dir.join("7zz-linux"), body).unwrap();
        ToolBundle::with_payloads(
            dir.to_path_buf(),
            vec![(Platform::Linux, "7zz-linux".to_string())],
        )
    }

    #[test]
    fn provision_extracts_payload_with_executable_bit() {
        let assets = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        let bundle = bundle_with_linux_payload(assets.path(), b"#!/bin/sh\nexit 0\n");

        let tool = bundle.provision(staging.path(), Platform::Linux).unwrap();
        assert_eq!(tool.path(), staging.path().join("7zz-linux"));
        assert!(tool.path().is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(tool.path()).unwrap().permissions().mode();
            assert_ne!(mode & 0o111, 0, "payload is not executable: {mode:o}");
        }
    }

    #[test]
    fn provisioned_tool_is_deleted_on_drop() {
        let assets = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        let bundle = bundle_with_linux_payload(assets.path(), b"payload");

        let tool = bundle.provision(staging.path(), Platform::Linux).unwrap();
        let path = tool.path().to_path_buf();
        assert!(path.exists());
        drop(tool);
        assert!(!path.exists());
    }

    #[test]
    fn provision_fails_for_platform_without_payload() {
        let staging = TempDir::new().unwrap();
        let bundle = ToolBundle::new(PathBuf::from("/nonexistent"));
        let result = bundle.provision(staging.path(), Platform::Linux);
        assert!(matches!(
            result,
            Err(BackupError::UnsupportedPlatform(ref p)) if p == "linux"
        ));
    }

    #[test]
    fn provision_fails_when_payload_file_is_missing() {
        let assets = TempDir::new().unwrap();
        let staging = TempDir::new().unwrap();
        let bundle = ToolBundle::with_payloads(
            assets.path().to_path_buf(),
            vec![(Platform::Linux, "7zz-linux".to_string())],
        );
        assert!(matches!(
            bundle.provision(staging.path(), Platform::Linux),
            Err(BackupError::Io { .. })
        ));
    }
}
