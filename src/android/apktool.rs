//! Package decompilation via apktool.
//!
//! `apktool d <apk> -o <dir> -f` decodes the binary manifest into text. A
//! zero exit status is not enough on its own: the manifest must also exist
//! at `<dir>/AndroidManifest.xml` afterwards.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{LinkProbeError, Result};

/// Manifest location inside a decoded package.
pub const MANIFEST_FILE: &str = "AndroidManifest.xml";

/// Where decoded output lives for the duration of a run.
#[derive(Debug)]
pub enum OutputDir {
    /// Removed when dropped.
    Temp(TempDir),
    /// A caller-chosen directory; removed by [`OutputDir::finish`] unless kept.
    Fixed { path: PathBuf, keep: bool },
}

impl OutputDir {
    pub fn temp() -> Result<Self> {
        Ok(OutputDir::Temp(
            tempfile::Builder::new().prefix("linkprobe-").tempdir()?,
        ))
    }

    pub fn fixed(path: PathBuf, keep: bool) -> Self {
        OutputDir::Fixed { path, keep }
    }

    pub fn path(&self) -> &Path {
        match self {
            OutputDir::Temp(dir) => dir.path(),
            OutputDir::Fixed { path, .. } => path,
        }
    }

    /// Release the directory. Cleanup problems are logged, never raised.
    pub fn finish(self) {
        match self {
            OutputDir::Temp(dir) => {
                let path = dir.path().to_path_buf();
                if let Err(e) = dir.close() {
                    warn!(path = %path.display(), error = %e, "Failed to remove temporary files");
                }
            }
            OutputDir::Fixed { path, keep: true } => {
                info!(path = %path.display(), "Keeping decoded output");
            }
            OutputDir::Fixed { path, keep: false } => match std::fs::remove_dir_all(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed decoded output"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove decoded output")
                }
            },
        }
    }
}

/// Runs the external decompiler.
#[derive(Debug, Clone)]
pub struct Decompiler {
    apktool: PathBuf,
}

impl Default for Decompiler {
    fn default() -> Self {
        Self::new("apktool")
    }
}

impl Decompiler {
    pub fn new(apktool: impl Into<PathBuf>) -> Self {
        Self {
            apktool: apktool.into(),
        }
    }

    /// Decode `apk` into `out_dir` and return the manifest path.
    pub async fn decompile(&self, apk: &Path, out_dir: &Path) -> Result<PathBuf> {
        if !apk.is_file() {
            return Err(LinkProbeError::Decompile(format!(
                "package not found: {}",
                apk.display()
            )));
        }

        info!(apk = %apk.display(), out = %out_dir.display(), "Decompiling package");
        let status = Command::new(&self.apktool)
            .arg("d")
            .arg(apk)
            .arg("-o")
            .arg(out_dir)
            .arg("-f")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| {
                LinkProbeError::Decompile(format!(
                    "failed to run '{}': {}",
                    self.apktool.display(),
                    e
                ))
            })?;

        if !status.success() {
            return Err(LinkProbeError::Decompile(format!(
                "'{}' exited with {}",
                self.apktool.display(),
                status
            )));
        }

        expect_manifest(out_dir)
    }
}

/// Path of the decoded manifest, or `MissingManifest` if it is absent.
pub fn expect_manifest(out_dir: &Path) -> Result<PathBuf> {
    let manifest = out_dir.join(MANIFEST_FILE);
    if manifest.is_file() {
        Ok(manifest)
    } else {
        Err(LinkProbeError::MissingManifest(manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_manifest_present() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_FILE), "<manifest/>").unwrap();
        assert_eq!(
            expect_manifest(tmp.path()).unwrap(),
            tmp.path().join(MANIFEST_FILE)
        );
    }

    #[test]
    fn test_expect_manifest_absent() {
        let tmp = TempDir::new().unwrap();
        let err = expect_manifest(tmp.path()).unwrap_err();
        assert!(matches!(err, LinkProbeError::MissingManifest(_)));
    }

    #[tokio::test]
    async fn test_decompile_missing_package() {
        let tmp = TempDir::new().unwrap();
        let err = Decompiler::default()
            .decompile(&tmp.path().join("app.apk"), tmp.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("package not found"), "Got: {}", err);
    }

    #[tokio::test]
    async fn test_decompile_missing_tool() {
        let tmp = TempDir::new().unwrap();
        let apk = tmp.path().join("app.apk");
        std::fs::write(&apk, b"PK").unwrap();
        let err = Decompiler::new("/nonexistent/apktool")
            .decompile(&apk, &tmp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkProbeError::Decompile(_)));
        assert!(err.to_string().contains("failed to run"), "Got: {}", err);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_exit_without_manifest() {
        let tmp = TempDir::new().unwrap();
        let apk = tmp.path().join("app.apk");
        std::fs::write(&apk, b"PK").unwrap();
        // `true` ignores its arguments and exits 0 without writing anything.
        let err = Decompiler::new("true")
            .decompile(&apk, &tmp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkProbeError::MissingManifest(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_decompiler() {
        let tmp = TempDir::new().unwrap();
        let apk = tmp.path().join("app.apk");
        std::fs::write(&apk, b"PK").unwrap();
        let err = Decompiler::new("false")
            .decompile(&apk, &tmp.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkProbeError::Decompile(_)));
    }

    #[test]
    fn test_fixed_output_removed_unless_kept() {
        let tmp = TempDir::new().unwrap();
        let removed = tmp.path().join("removed");
        let kept = tmp.path().join("kept");
        std::fs::create_dir_all(&removed).unwrap();
        std::fs::create_dir_all(&kept).unwrap();

        OutputDir::fixed(removed.clone(), false).finish();
        OutputDir::fixed(kept.clone(), true).finish();

        assert!(!removed.exists());
        assert!(kept.exists());
    }

    #[test]
    fn test_temp_output_is_removed() {
        let out = OutputDir::temp().unwrap();
        let path = out.path().to_path_buf();
        assert!(path.exists());
        out.finish();
        assert!(!path.exists());
    }
}
