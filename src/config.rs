//! Configuration for LinkProbe.
//!
//! Loaded from `~/.linkprobe/config.json` when present, then overridden by
//! `LINKPROBE_*` environment variables. Missing fields take defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LinkProbeError, Result};
use crate::mutate::DEFAULT_SEED;

/// Paths to the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub adb: PathBuf,
    pub apktool: PathBuf,
    pub radamsa: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            adb: PathBuf::from("adb"),
            apktool: PathBuf::from("apktool"),
            radamsa: PathBuf::from("radamsa"),
        }
    }
}

/// Fuzz session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzConfig {
    /// Per-candidate deadline in milliseconds.
    pub command_timeout_ms: u64,
    /// Device serial passed as `adb -s`; the default device when unset.
    pub device_serial: Option<String>,
    /// Seed string piped to the mutator.
    pub mutation_seed: String,
    pub mutation_timeout_ms: u64,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 2000,
            device_serial: None,
            mutation_seed: DEFAULT_SEED.to_string(),
            mutation_timeout_ms: 5000,
        }
    }
}

impl FuzzConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn mutation_timeout(&self) -> Duration {
        Duration::from_millis(self.mutation_timeout_ms)
    }
}

/// Where decoded packages are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Fixed output directory; a temporary one is used when unset.
    pub output_dir: Option<PathBuf>,
    /// Leave the fixed output directory in place after the run.
    pub keep_output: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub fuzz: FuzzConfig,
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// `~/.linkprobe`, falling back to `./.linkprobe` without a home directory.
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".linkprobe")
    }

    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load the default config file (if any) and apply env overrides.
    pub fn load() -> Result<Self> {
        Self::load_with_env(&Self::path())
    }

    /// Load `path` (if it exists) and apply env overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_path(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse the file at `path` without env overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LinkProbeError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            LinkProbeError::Config(format!("invalid config {}: {}", path.display(), e))
        })
    }

    /// Apply `LINKPROBE_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LINKPROBE_ADB") {
            self.tools.adb = PathBuf::from(v);
        }
        if let Some(v) = lookup("LINKPROBE_APKTOOL") {
            self.tools.apktool = PathBuf::from(v);
        }
        if let Some(v) = lookup("LINKPROBE_RADAMSA") {
            self.tools.radamsa = PathBuf::from(v);
        }
        if let Some(v) = lookup("LINKPROBE_TIMEOUT_MS") {
            self.fuzz.command_timeout_ms = v.trim().parse().map_err(|_| {
                LinkProbeError::Config(format!(
                    "LINKPROBE_TIMEOUT_MS must be a whole number of milliseconds, got '{}'",
                    v
                ))
            })?;
        }
        if let Some(v) = lookup("LINKPROBE_DEVICE") {
            self.fuzz.device_serial = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = lookup("LINKPROBE_OUTPUT_DIR") {
            self.workspace.output_dir = Some(PathBuf::from(v));
        }
        Ok(())
    }
}
