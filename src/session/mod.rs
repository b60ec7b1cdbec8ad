//! Session and transport contracts
//!
//! The session owns the work queue, configuration and result log for one run;
//! the scheduler drives it one check at a time. Transports are the protocol
//! collaborators: one per variant family, translating their native failures
//! into the closed taxonomy at their own boundary.

mod standard;

pub use standard::{CheckRecord, RunTotals, StandardSession};

use crate::reference::{decode_with, Reference};
use crate::{RunError, TransportResult};
use encoding_rs::Encoding;
use std::time::Instant;

/// Run-state collaborator driven by the scheduler
///
/// The scheduler's contract is non-reentrant: `check_one` is never invoked
/// concurrently with itself. Whether a session parallelizes the inside of a
/// single check is its own concern.
pub trait Session {
    /// Returns true when no work remains
    fn finished(&self) -> bool;

    /// Performs exactly one check
    ///
    /// Recoverable failures are recorded on the reference and return `Ok`.
    /// `Err(RunError::Cancelled)` reports operator cancellation observed
    /// between checks; any other error is fatal and propagates.
    fn check_one(&mut self) -> Result<(), RunError>;

    /// Whether periodic status reporting is enabled in configuration
    fn status_enabled(&self) -> bool;

    /// Emits a status line; best-effort, must not block the check loop
    fn print_status(&mut self, now: Instant, start: Instant);

    /// Finalizes the run's output; called exactly once per run
    fn finalize_output(&mut self);

    /// Aborts the run after cancellation, before output finalization
    fn abort(&mut self);
}

/// A reference discovered while checking a parent document
#[derive(Debug, Clone)]
pub struct DiscoveredLink {
    /// Raw link text as found in the document
    pub href: String,
    /// Source line within the parent document
    pub line: u32,
    /// Source column within the parent document
    pub column: u32,
    /// Display name of the link
    pub name: String,
}

impl DiscoveredLink {
    /// Builds a discovered link from raw document bytes
    ///
    /// Transports hand over href and name bytes as found in the fetched
    /// document; both are decoded with the parent reference's encoding
    /// ([`Reference::encoding`]), lossily by policy.
    pub fn from_bytes(
        href: &[u8],
        name: &[u8],
        line: u32,
        column: u32,
        encoding: &'static Encoding,
    ) -> Self {
        Self {
            href: decode_with(href, encoding).into_owned(),
            line,
            column,
            name: decode_with(name, encoding).into_owned(),
        }
    }
}

/// What a transport learned from one successful check
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Human-readable detail for the result log
    pub info: Option<String>,
    /// Child references found in the checked document
    pub discovered: Vec<DiscoveredLink>,
}

/// Protocol collaborator performing the actual byte-level check
///
/// Implementations translate their native failures into [`crate::CheckError`]
/// at this boundary; anything that does not fit the closed taxonomy surfaces
/// as [`crate::TransportError::Fatal`] and terminates the run.
pub trait Transport {
    fn check(&self, reference: &Reference) -> TransportResult;
}
