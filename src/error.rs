//! Error types for LinkProbe.
//!
//! Manifest-stage errors abort an analysis run. Per-candidate command
//! failures are never errors; they are reported as
//! [`CommandOutcome`](crate::runner::CommandOutcome) values instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the LinkProbe library.
#[derive(Error, Debug)]
pub enum LinkProbeError {
    /// The manifest text is not well-formed markup.
    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    /// Decompilation succeeded but produced no manifest at the expected path.
    #[error("Decompilation produced no manifest at {}", .0.display())]
    MissingManifest(PathBuf),

    /// The external decompiler could not be run or exited non-zero.
    #[error("Decompiler error: {0}")]
    Decompile(String),

    /// Nothing to fuzz: no links, activities, or words.
    #[error("No candidates generated: {0}")]
    EmptyCandidateSet(String),

    #[error("Wordlist error: {0}")]
    Wordlist(String),

    /// The external mutation tool is unusable.
    #[error("Mutation error: {0}")]
    Mutation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkProbeError {
    /// Whether this error ends the run before any candidate is dispatched.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LinkProbeError::EmptyCandidateSet(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LinkProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_manifest_display_includes_path() {
        let err = LinkProbeError::MissingManifest(PathBuf::from("/tmp/out/AndroidManifest.xml"));
        assert_eq!(
            err.to_string(),
            "Decompilation produced no manifest at /tmp/out/AndroidManifest.xml"
        );
    }

    #[test]
    fn test_empty_candidate_set_is_not_fatal() {
        assert!(!LinkProbeError::EmptyCandidateSet("no deep links".into()).is_fatal());
        assert!(LinkProbeError::MalformedManifest("eof".into()).is_fatal());
        assert!(LinkProbeError::MissingManifest(PathBuf::from("x")).is_fatal());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LinkProbeError = io.into();
        assert!(matches!(err, LinkProbeError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
