//! Fuzz session driver.
//!
//! Feeds candidates one at a time, in generation order, through a
//! [`CommandRunner`]. Any outcome other than success is logged with the
//! offending command and the session moves on; no candidate aborts the
//! sweep and none is retried. Session cancellation is checked between
//! candidates only, never inside an in-flight invocation.

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::android::AdbBridge;
use crate::candidates::Candidate;
use crate::error::{LinkProbeError, Result};
use crate::runner::{CommandOutcome, CommandRunner};

/// Default per-candidate deadline.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Lifecycle of one candidate within a session.
///
/// Candidates left `Pending` in a report were never sent, which only happens
/// after cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateState {
    Pending,
    Running,
    Succeeded,
    /// Timed out or failed; recorded and passed over.
    Skipped,
}

impl CandidateState {
    fn start(self) -> Self {
        debug_assert_eq!(self, CandidateState::Pending, "candidate started twice");
        CandidateState::Running
    }

    fn finish(self, outcome: &CommandOutcome) -> Self {
        debug_assert_eq!(self, CandidateState::Running, "candidate finished without starting");
        if outcome.is_success() {
            CandidateState::Succeeded
        } else {
            CandidateState::Skipped
        }
    }
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Completed,
    Cancelled,
}

/// Aggregate counts for a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub generated: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub timed_out: usize,
    pub failed: usize,
    pub outcome: SessionOutcome,
    /// Final state of each candidate, in generation order.
    pub states: Vec<CandidateState>,
}

impl SessionReport {
    fn new(generated: usize) -> Self {
        Self {
            generated,
            processed: 0,
            succeeded: 0,
            timed_out: 0,
            failed: 0,
            outcome: SessionOutcome::Completed,
            states: vec![CandidateState::Pending; generated],
        }
    }

    fn start(&mut self, index: usize) {
        self.states[index] = self.states[index].start();
    }

    fn record(&mut self, index: usize, outcome: &CommandOutcome) -> CandidateState {
        self.states[index] = self.states[index].finish(outcome);
        self.processed += 1;
        match outcome {
            CommandOutcome::Success => self.succeeded += 1,
            CommandOutcome::TimedOut => self.timed_out += 1,
            CommandOutcome::Failed { .. } => self.failed += 1,
        }
        self.states[index]
    }
}

/// Drives a candidate sequence against one device.
pub struct FuzzSession<'a> {
    runner: &'a dyn CommandRunner,
    bridge: &'a AdbBridge,
    package: String,
    timeout: Duration,
    cancel: CancellationToken,
}

impl<'a> FuzzSession<'a> {
    pub fn new(runner: &'a dyn CommandRunner, bridge: &'a AdbBridge, package: &str) -> Self {
        Self {
            runner,
            bridge,
            package: package.to_string(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every candidate in order.
    ///
    /// Fails only when there is nothing to run
    /// ([`LinkProbeError::EmptyCandidateSet`]); per-candidate failures are
    /// counted in the report.
    pub async fn run(&self, candidates: Vec<Candidate>) -> Result<SessionReport> {
        if candidates.is_empty() {
            return Err(LinkProbeError::EmptyCandidateSet(
                "nothing to send to the device".into(),
            ));
        }

        let total = candidates.len();
        let mut report = SessionReport::new(total);
        info!(
            candidates = total,
            timeout_ms = self.timeout.as_millis() as u64,
            "Starting fuzz session"
        );

        for (index, candidate) in candidates.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(processed = report.processed, total, "Session cancelled");
                report.outcome = SessionOutcome::Cancelled;
                break;
            }

            let command = self.bridge.start_command(&self.package, &candidate);
            report.start(index);
            info!(n = index + 1, total, command = %command, "Running");

            let outcome = self.runner.run(&command, self.timeout).await;
            match report.record(index, &outcome) {
                CandidateState::Skipped => warn!(
                    uri = %candidate.uri,
                    command = %command,
                    outcome = %outcome,
                    "Candidate skipped; continuing"
                ),
                _ => debug!(uri = %candidate.uri, "Candidate succeeded"),
            }
        }

        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            timed_out = report.timed_out,
            failed = report.failed,
            "Fuzz session finished"
        );
        Ok(report)
    }
}
