//! The check loop
//!
//! Single-threaded cooperative scheduling: one check per iteration, with a
//! bounded-frequency status channel and a single, orderly cancellation path.
//! The scheduler performs no I/O itself; everything is delegated to the
//! session and the referenced variant's own check.

use crate::session::Session;
use crate::RunError;
use std::time::{Duration, Instant};

/// Minimum wall-clock time between status emissions
const STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All queued checks completed
    Completed,
    /// Operator cancellation; the abort path ran and output was finalized
    Cancelled,
}

/// Drives the session until it reports no remaining work
///
/// Each iteration performs exactly one check. Status is emitted best-effort
/// when enabled and at least [`STATUS_INTERVAL`] has passed since the last
/// emission; it is strictly appended after the check and never gates the
/// loop.
///
/// Termination paths:
/// - normal completion: `finalize_output` is called exactly once;
/// - cancellation: `abort` then `finalize_output`, in that order, each
///   exactly once;
/// - fatal error: propagated untouched. The scheduler makes neither call;
///   attempting finalization then is the caller's concern.
pub fn run_checks<S: Session>(session: &mut S) -> Result<RunOutcome, RunError> {
    let start = Instant::now();
    let mut last_status = start;

    let loop_result = loop {
        if session.finished() {
            break Ok(());
        }

        if let Err(err) = session.check_one() {
            break Err(err);
        }

        if session.status_enabled() {
            let now = Instant::now();
            if now.duration_since(last_status) > STATUS_INTERVAL {
                session.print_status(now, start);
                last_status = now;
            }
        }
    };

    match loop_result {
        Ok(()) => {
            session.finalize_output();
            Ok(RunOutcome::Completed)
        }
        Err(RunError::Cancelled) => {
            session.abort();
            session.finalize_output();
            Ok(RunOutcome::Cancelled)
        }
        // Only the cancellation signal is caught at this level
        Err(fatal) => Err(fatal),
    }
}
