//! Fuzz-word generation through an external mutator (radamsa).
//!
//! Each word is one radamsa run over the seed on stdin. A failed or slow
//! run is logged and skipped; only an unusable binary is an error.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{LinkProbeError, Result};

/// Default seed handed to the mutator.
pub const DEFAULT_SEED: &str = "💩";

#[derive(Debug, Clone)]
pub struct Mutator {
    radamsa: PathBuf,
    timeout: Duration,
}

impl Mutator {
    pub fn new(radamsa: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            radamsa: radamsa.into(),
            timeout,
        }
    }

    /// Produce up to `count` mutated words from `seed`.
    ///
    /// Empty results are dropped, so fewer than `count` words may come back.
    pub async fn generate(&self, seed: &str, count: usize) -> Result<Vec<String>> {
        let mut words = Vec::with_capacity(count);
        for index in 0..count {
            match self.mutate_once(seed).await {
                Ok(word) if word.is_empty() => {
                    debug!(index, "mutator produced an empty word; skipping");
                }
                Ok(word) => words.push(word),
                Err(e @ LinkProbeError::Mutation(_)) if index == 0 => return Err(e),
                Err(e) => warn!(index, error = %e, "mutator run failed; skipping"),
            }
        }
        Ok(words)
    }

    async fn mutate_once(&self, seed: &str) -> Result<String> {
        let mut child = Command::new(&self.radamsa)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                LinkProbeError::Mutation(format!(
                    "failed to run '{}': {}",
                    self.radamsa.display(),
                    e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(seed.as_bytes()).await?;
            // Dropping stdin closes it so the mutator sees EOF.
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::TimedOut, "mutator timed out")
            })??;

        if !output.status.success() {
            return Err(LinkProbeError::Io(std::io::Error::other(format!(
                "mutator exited with {}",
                output.status
            ))));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
