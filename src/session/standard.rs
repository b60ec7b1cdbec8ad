//! Standard in-memory session
//!
//! Owns the work queue, the scope rule set, the transport registry and the
//! result log for one run. References enter the queue on creation and leave
//! it exactly once; their outcome is retired into a [`CheckRecord`].

use crate::config::Config;
use crate::reference::{build_reference, decode_with, BuildContext, CheckOutcome, Origin, Reference};
use crate::scheme::LinkKind;
use crate::scope::{Scope, ScopeSet};
use crate::session::{CheckReport, DiscoveredLink, Session, Transport};
use crate::{ConfigResult, RunError, TransportError};
use encoding_rs::Encoding;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// One retired check, kept for reporting
#[derive(Debug)]
pub struct CheckRecord {
    /// The checked target text
    pub target: String,
    /// Protocol variant
    pub kind: LinkKind,
    /// Which side of the checked boundary the reference fell on
    pub scope: Scope,
    /// Hop count from the original seed
    pub depth: u32,
    /// Source line within the parent document
    pub line: u32,
    /// Source column within the parent document
    pub column: u32,
    /// Display name of the link
    pub name: String,
    /// Parent document location, if discovered
    pub parent_url: Option<String>,
    /// The recorded outcome
    pub outcome: CheckOutcome,
}

/// Per-outcome counters for the run
#[derive(Debug, Default, Clone, Copy)]
pub struct RunTotals {
    pub checked: u64,
    pub valid: u64,
    pub failed: u64,
    pub skipped: u64,
    pub invalid: u64,
}

impl RunTotals {
    /// Number of outcomes that count as problems in the final report
    pub fn problems(&self) -> u64 {
        self.failed + self.invalid
    }
}

/// In-memory session: FIFO work queue, checked-once dedup, result log
pub struct StandardSession {
    config: Config,
    scope: ScopeSet,
    transports: HashMap<LinkKind, Box<dyn Transport>>,
    queue: VecDeque<Reference>,
    seen: HashSet<String>,
    records: Vec<CheckRecord>,
    totals: RunTotals,
    cancel: Arc<AtomicBool>,
    aborted: bool,
    status_count: u64,
    encoding: &'static Encoding,
}

impl StandardSession {
    /// Creates a session from a validated configuration
    ///
    /// Compiles the configured intern/extern patterns into the scope set.
    /// Rules are append-only from here until checking starts.
    pub fn new(config: Config) -> ConfigResult<Self> {
        let scope = config.compile_scope_rules()?;
        let encoding = config.fallback_encoding();

        Ok(Self {
            config,
            scope,
            transports: HashMap::new(),
            queue: VecDeque::new(),
            seen: HashSet::new(),
            records: Vec::new(),
            totals: RunTotals::default(),
            cancel: Arc::new(AtomicBool::new(false)),
            aborted: false,
            status_count: 0,
            encoding,
        })
    }

    /// Installs the transport for a variant family
    ///
    /// Must happen before checking starts; the registry is read-only for the
    /// run afterwards.
    pub fn register_transport(&mut self, kind: LinkKind, transport: Box<dyn Transport>) {
        self.transports.insert(kind, transport);
    }

    /// Shared cancellation flag, observed between checks
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Builds and enqueues an operator-supplied seed reference
    pub fn enqueue_seed(&mut self, raw: &str) {
        let ctx = BuildContext {
            name: raw,
            ..BuildContext::default()
        };
        let reference = build_reference(
            raw,
            0,
            Origin::OperatorSupplied,
            &ctx,
            &mut self.scope,
            self.encoding,
        );
        self.enqueue(reference);
    }

    /// Decodes and enqueues a seed supplied as raw bytes
    ///
    /// Seeds read from files or non-UTF-8 environments are decoded with the
    /// configured fallback encoding, lossily by policy.
    pub fn enqueue_seed_bytes(&mut self, raw: &[u8]) {
        let decoded = decode_with(raw, self.encoding);
        self.enqueue_seed(&decoded);
    }

    /// Enqueues a reference, enforcing the recursion bound and the
    /// checked-at-most-once guarantee
    fn enqueue(&mut self, reference: Reference) {
        let bound = self.config.checker.recursion_depth;
        if bound >= 0 && u64::from(reference.depth()) > bound as u64 {
            tracing::debug!(
                "Dropping {} at depth {} (recursion bound {})",
                reference.target(),
                reference.depth(),
                bound
            );
            return;
        }

        if !self.seen.insert(reference.target().to_string()) {
            tracing::debug!("Already queued or checked: {}", reference.target());
            return;
        }

        self.queue.push_back(reference);
    }

    /// Pending references, in check order (for previews and tests)
    pub fn pending(&self) -> impl Iterator<Item = &Reference> {
        self.queue.iter()
    }

    /// Retired check records, in completion order
    pub fn records(&self) -> &[CheckRecord] {
        &self.records
    }

    /// Per-outcome counters so far
    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    /// Number of status lines emitted so far
    pub fn status_count(&self) -> u64 {
        self.status_count
    }

    /// The compiled scope rule set
    pub fn scope(&self) -> &ScopeSet {
        &self.scope
    }

    /// Runs one reference's check and produces its outcome
    ///
    /// Inert variants resolve locally; checkable variants are delegated to
    /// their transport. A recoverable transport failure becomes a `Failed`
    /// outcome; a fatal one propagates untouched.
    fn perform_check(&mut self, reference: &Reference) -> Result<CheckOutcome, RunError> {
        match reference.kind() {
            LinkKind::Ignored => {
                return Ok(CheckOutcome::Skipped {
                    reason: "ignored scheme".to_string(),
                })
            }
            LinkKind::Error => {
                let diagnostic = reference
                    .diagnostic()
                    .unwrap_or("unsupported or unresolved scheme")
                    .to_string();
                return Ok(CheckOutcome::Invalid { diagnostic });
            }
            _ => {}
        }

        let result = match self.transports.get(&reference.kind()) {
            None => {
                return Ok(CheckOutcome::Skipped {
                    reason: format!("no transport configured for {}", reference.kind()),
                })
            }
            Some(transport) => transport.check(reference),
        };

        match result {
            Ok(report) => {
                let CheckReport { info, discovered } = report;
                if !discovered.is_empty() {
                    if self.scope.classify(reference.target()) == Scope::Intern {
                        self.enqueue_children(reference, discovered);
                    } else {
                        // Extern references are checked but never expanded
                        tracing::debug!(
                            "Not expanding extern reference {} ({} children dropped)",
                            reference.target(),
                            discovered.len()
                        );
                    }
                }
                Ok(CheckOutcome::Valid { info })
            }
            Err(TransportError::Check(err)) => Ok(CheckOutcome::Failed(err)),
            Err(TransportError::Fatal(err)) => Err(RunError::Fatal(err)),
        }
    }

    /// Builds and enqueues the children a check discovered
    ///
    /// Child depth is always parent depth + 1; the recursion bound is applied
    /// at enqueue time.
    fn enqueue_children(&mut self, parent: &Reference, discovered: Vec<DiscoveredLink>) {
        for link in discovered {
            let ctx = BuildContext {
                parent_url: Some(parent.target()),
                base_ref: parent.base_ref(),
                line: link.line,
                column: link.column,
                name: &link.name,
                parent_name: parent.name(),
            };
            let child = build_reference(
                &link.href,
                parent.depth() + 1,
                Origin::Discovered,
                &ctx,
                &mut self.scope,
                self.encoding,
            );
            self.enqueue(child);
        }
    }

    /// Retires a checked reference into the result log
    fn log_result(&mut self, mut reference: Reference) {
        let outcome = match reference.take_outcome() {
            Some(outcome) => outcome,
            // Unreachable through check_one, but never lose a reference
            None => CheckOutcome::Skipped {
                reason: "no outcome recorded".to_string(),
            },
        };

        self.totals.checked += 1;
        match &outcome {
            CheckOutcome::Valid { .. } => self.totals.valid += 1,
            CheckOutcome::Failed(err) => {
                self.totals.failed += 1;
                tracing::warn!("{}: {}", reference.target(), err);
            }
            CheckOutcome::Skipped { .. } => self.totals.skipped += 1,
            CheckOutcome::Invalid { diagnostic } => {
                self.totals.invalid += 1;
                tracing::warn!("{}: {}", reference.target(), diagnostic);
            }
        }

        let (line, column) = reference.position();
        self.records.push(CheckRecord {
            target: reference.target().to_string(),
            kind: reference.kind(),
            scope: self.scope.classify(reference.target()),
            depth: reference.depth(),
            line,
            column,
            name: reference.name().to_string(),
            parent_url: reference.parent().map(|p| p.url.clone()),
            outcome,
        });
    }
}

impl Session for StandardSession {
    fn finished(&self) -> bool {
        self.queue.is_empty()
    }

    fn check_one(&mut self) -> Result<(), RunError> {
        // Cancellation is observed here, between checks, never mid-check.
        // The in-flight reference stays unlogged.
        if self.cancel.load(Ordering::Relaxed) {
            return Err(RunError::Cancelled);
        }

        let Some(mut reference) = self.queue.pop_front() else {
            return Ok(());
        };

        let outcome = self.perform_check(&reference)?;
        reference.record_outcome(outcome);
        self.log_result(reference);
        Ok(())
    }

    fn status_enabled(&self) -> bool {
        self.config.checker.status
    }

    fn print_status(&mut self, now: Instant, start: Instant) {
        self.status_count += 1;
        tracing::info!(
            "Status: {} checked ({} problems), {} queued, {}s elapsed",
            self.totals.checked,
            self.totals.problems(),
            self.queue.len(),
            now.duration_since(start).as_secs()
        );
    }

    fn finalize_output(&mut self) {
        println!("=== Check Results ===\n");
        if self.aborted {
            println!("Run aborted; results are partial.\n");
        }

        println!("Checked: {}", self.totals.checked);
        println!("  Valid:   {}", self.totals.valid);
        println!("  Failed:  {}", self.totals.failed);
        println!("  Invalid: {}", self.totals.invalid);
        println!("  Skipped: {}", self.totals.skipped);

        let problems: Vec<&CheckRecord> = self
            .records
            .iter()
            .filter(|r| r.outcome.is_problem())
            .collect();
        if !problems.is_empty() {
            println!("\nProblems:");
            for record in problems {
                match &record.parent_url {
                    Some(parent) => println!(
                        "  {} ({}, {}) at {}:{}:{} — {}",
                        record.target, record.kind, record.scope, parent, record.line,
                        record.column, record.outcome
                    ),
                    None => println!(
                        "  {} ({}, {}) — {}",
                        record.target, record.kind, record.scope, record.outcome
                    ),
                }
            }
        }

        println!(
            "\nFinished at {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }

    fn abort(&mut self) {
        self.aborted = true;
        let dropped = self.queue.len();
        self.queue.clear();
        tracing::warn!("Run aborted, {} queued checks dropped", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CheckError;

    /// Transport stub: answers valid and reports the configured children
    struct StubTransport {
        discovered: Vec<DiscoveredLink>,
    }

    impl Transport for StubTransport {
        fn check(&self, _reference: &Reference) -> Result<CheckReport, TransportError> {
            Ok(CheckReport {
                info: None,
                discovered: self.discovered.clone(),
            })
        }
    }

    /// Transport stub: always fails with a recoverable timeout
    struct TimeoutTransport;

    impl Transport for TimeoutTransport {
        fn check(&self, reference: &Reference) -> Result<CheckReport, TransportError> {
            Err(TransportError::Check(CheckError::Timeout {
                url: reference.target().to_string(),
            }))
        }
    }

    /// Transport stub: fails outside the recoverable taxonomy
    struct BrokenTransport;

    impl Transport for BrokenTransport {
        fn check(&self, _reference: &Reference) -> Result<CheckReport, TransportError> {
            Err(TransportError::Fatal("collaborator defect".into()))
        }
    }

    fn link(href: &str) -> DiscoveredLink {
        DiscoveredLink {
            href: href.to_string(),
            line: 1,
            column: 1,
            name: href.to_string(),
        }
    }

    fn session() -> StandardSession {
        StandardSession::new(Config::default()).unwrap()
    }

    fn drain(session: &mut StandardSession) {
        while !session.finished() {
            session.check_one().unwrap();
        }
    }

    #[test]
    fn test_seed_checked_and_logged() {
        let mut s = session();
        s.register_transport(LinkKind::Http, Box::new(StubTransport { discovered: vec![] }));
        s.enqueue_seed("http://example.com/start");
        drain(&mut s);

        assert_eq!(s.totals().checked, 1);
        assert_eq!(s.totals().valid, 1);
        assert_eq!(s.records()[0].scope, Scope::Intern);
    }

    #[test]
    fn test_discovered_children_depth_increases() {
        let mut s = session();
        s.register_transport(
            LinkKind::Http,
            Box::new(StubTransport {
                discovered: vec![link("http://example.com/child")],
            }),
        );
        s.enqueue_seed("http://example.com/");
        drain(&mut s);

        let child = s
            .records()
            .iter()
            .find(|r| r.target == "http://example.com/child")
            .expect("child checked");
        assert_eq!(child.depth, 1);
        assert_eq!(
            child.parent_url.as_deref(),
            Some("http://example.com/")
        );
    }

    #[test]
    fn test_reference_checked_at_most_once() {
        let mut s = session();
        s.register_transport(
            LinkKind::Http,
            Box::new(StubTransport {
                // Every check re-discovers the seed itself
                discovered: vec![link("http://example.com/")],
            }),
        );
        s.enqueue_seed("http://example.com/");
        drain(&mut s);

        assert_eq!(s.totals().checked, 1);
    }

    #[test]
    fn test_recursion_bound_enforced() {
        let mut config = Config::default();
        config.checker.recursion_depth = 1;
        let mut s = StandardSession::new(config).unwrap();
        s.register_transport(
            LinkKind::Http,
            Box::new(StubTransport {
                discovered: vec![link("http://example.com/a/b")],
            }),
        );
        // Seed (0) discovers /a/b (1), which re-discovers /a/b (dedup);
        // enqueue a distinct chain to exercise depth 2
        s.enqueue_seed("http://example.com/");
        drain(&mut s);

        // Depth-2 children of the depth-1 page are over the bound
        assert!(s.records().iter().all(|r| r.depth <= 1));
    }

    #[test]
    fn test_extern_reference_not_expanded() {
        let mut config = Config::default();
        config.scope.intern_links = vec!["^http://inside\\.example".to_string()];
        let mut s = StandardSession::new(config).unwrap();
        s.register_transport(
            LinkKind::Http,
            Box::new(StubTransport {
                discovered: vec![link("http://outside.example/found")],
            }),
        );
        // Seed is extern under the configured rules; its children are dropped
        s.enqueue_seed("http://outside.example/");
        drain(&mut s);

        assert_eq!(s.totals().checked, 1);
        assert_eq!(s.records()[0].scope, Scope::Extern);
    }

    #[test]
    fn test_recoverable_failure_recorded_run_continues() {
        let mut s = session();
        s.register_transport(LinkKind::Http, Box::new(TimeoutTransport));
        s.enqueue_seed("http://example.com/a");
        s.enqueue_seed("http://example.com/b");
        drain(&mut s);

        assert_eq!(s.totals().checked, 2);
        assert_eq!(s.totals().failed, 2);
    }

    #[test]
    fn test_fatal_failure_propagates() {
        let mut s = session();
        s.register_transport(LinkKind::Http, Box::new(BrokenTransport));
        s.enqueue_seed("http://example.com/");

        let result = s.check_one();
        assert!(matches!(result, Err(RunError::Fatal(_))));
        // The in-flight reference was not logged
        assert_eq!(s.totals().checked, 0);
    }

    #[test]
    fn test_missing_transport_skips() {
        let mut s = session();
        s.enqueue_seed("gopher://gopher.example/");
        drain(&mut s);

        assert_eq!(s.totals().skipped, 1);
        assert!(matches!(
            s.records()[0].outcome,
            CheckOutcome::Skipped { .. }
        ));
    }

    #[test]
    fn test_ignored_variant_never_reaches_transport() {
        let mut s = session();
        s.register_transport(LinkKind::Http, Box::new(BrokenTransport));
        s.enqueue_seed("tel:12345");
        drain(&mut s);

        // A broken transport would have blown up the run; tel: must not
        // touch it
        assert_eq!(s.totals().skipped, 1);
    }

    #[test]
    fn test_error_variant_reported_invalid() {
        let mut s = session();
        s.register_transport(
            LinkKind::Http,
            Box::new(StubTransport {
                discovered: vec![link("foobar://nonsense")],
            }),
        );
        s.enqueue_seed("http://example.com/");
        drain(&mut s);

        assert_eq!(s.totals().invalid, 1);
    }

    #[test]
    fn test_cancellation_observed_between_checks() {
        let mut s = session();
        s.register_transport(LinkKind::Http, Box::new(StubTransport { discovered: vec![] }));
        s.enqueue_seed("http://example.com/a");
        s.enqueue_seed("http://example.com/b");

        s.check_one().unwrap();
        s.cancel_flag().store(true, Ordering::Relaxed);

        let result = s.check_one();
        assert!(matches!(result, Err(RunError::Cancelled)));
        // The pending reference produced no log entry
        assert_eq!(s.totals().checked, 1);
    }

    #[test]
    fn test_byte_seed_decoded_with_configured_encoding() {
        let mut s = session();
        s.register_transport(LinkKind::Http, Box::new(StubTransport { discovered: vec![] }));
        // 0xE9 is e-acute in ISO-8859-15, the default fallback
        s.enqueue_seed_bytes(b"http://example.com/caf\xe9");
        drain(&mut s);

        assert_eq!(s.records()[0].target, "http://example.com/café");
        assert_eq!(s.totals().valid, 1);
    }

    #[test]
    fn test_discovered_bytes_decoded_with_reference_encoding() {
        struct ByteTransport;

        impl Transport for ByteTransport {
            fn check(&self, reference: &Reference) -> Result<CheckReport, TransportError> {
                if reference.depth() > 0 {
                    return Ok(CheckReport::default());
                }
                // 0xFC is u-umlaut in ISO-8859-15
                Ok(CheckReport {
                    info: None,
                    discovered: vec![DiscoveredLink::from_bytes(
                        b"http://example.com/men\xfc",
                        b"Men\xfc",
                        3,
                        1,
                        reference.encoding(),
                    )],
                })
            }
        }

        let mut s = session();
        s.register_transport(LinkKind::Http, Box::new(ByteTransport));
        s.enqueue_seed("http://example.com/");
        drain(&mut s);

        let child = s
            .records()
            .iter()
            .find(|r| r.target == "http://example.com/menü")
            .expect("decoded child checked");
        assert_eq!(child.name, "Menü");
        assert_eq!(child.line, 3);
    }

    #[test]
    fn test_abort_drops_queue() {
        let mut s = session();
        s.enqueue_seed("http://example.com/a");
        s.enqueue_seed("http://example.com/b");

        s.abort();
        assert!(s.finished());
        assert_eq!(s.totals().checked, 0);
    }
}
