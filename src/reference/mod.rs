//! References and their check outcomes
//!
//! A reference is one link target to be checked, together with the context it
//! was discovered in: parent document, recursion depth, source position and
//! display name. Ownership of a reference moves into the session's work queue
//! on creation; the core never retains it afterwards.

mod factory;
mod listing;

pub use factory::{build_reference, decode_with, resolve_absolute, BuildContext};
pub use listing::build_listing;

use crate::scheme::LinkKind;
use crate::CheckError;
use encoding_rs::Encoding;

/// Where a reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Supplied directly by the operator (command line, config)
    OperatorSupplied,
    /// Discovered while checking a parent document
    Discovered,
}

/// Back-link to the parent document, kept for reporting only
#[derive(Debug, Clone)]
pub struct ParentLink {
    /// Resolved text of the parent reference
    pub url: String,
    /// Display name of the parent reference
    pub name: String,
}

/// Result of checking one reference
#[derive(Debug)]
pub enum CheckOutcome {
    /// The reference checked out
    Valid { info: Option<String> },
    /// A recoverable failure from the closed taxonomy
    Failed(CheckError),
    /// Deliberately not checked (ignored scheme, missing transport)
    Skipped { reason: String },
    /// Inert error variant: unsupported or unresolved scheme
    Invalid { diagnostic: String },
}

impl CheckOutcome {
    /// Returns true if this outcome counts as a problem in the final report
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Invalid { .. })
    }

    /// Short lowercase tag for log lines and summaries
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Valid { .. } => "valid",
            Self::Failed(_) => "failed",
            Self::Skipped { .. } => "skipped",
            Self::Invalid { .. } => "invalid",
        }
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid { info: Some(info) } => write!(f, "valid ({})", info),
            Self::Valid { info: None } => f.write_str("valid"),
            Self::Failed(err) => write!(f, "failed: {}", err),
            Self::Skipped { reason } => write!(f, "skipped: {}", reason),
            Self::Invalid { diagnostic } => write!(f, "invalid: {}", diagnostic),
        }
    }
}

/// One link target to be checked, with discovery context
#[derive(Debug)]
pub struct Reference {
    /// The text as it appeared in the source document
    raw: String,
    /// Check identity: the case-folded raw text when it carries a scheme,
    /// otherwise the raw text joined against the base or parent location.
    /// `None` when neither applies; the raw text then stands in.
    absolute: Option<String>,
    /// Protocol variant
    kind: LinkKind,
    /// Hop count from the original seed
    depth: u32,
    /// Parent document, for reporting
    parent: Option<ParentLink>,
    /// Base reference declared by the parent document, if any
    base_ref: Option<String>,
    /// Source line within the parent document
    line: u32,
    /// Source column within the parent document
    column: u32,
    /// Display name of the link
    name: String,
    /// Operator-supplied or discovered
    origin: Origin,
    /// Encoding used to decode byte input for this reference
    encoding: &'static Encoding,
    /// Diagnostic attached at build time (inert error variant)
    diagnostic: Option<String>,
    /// Recorded outcome; set at most once
    outcome: Option<CheckOutcome>,
}

impl Reference {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        raw: String,
        absolute: Option<String>,
        kind: LinkKind,
        depth: u32,
        parent: Option<ParentLink>,
        base_ref: Option<String>,
        line: u32,
        column: u32,
        name: String,
        origin: Origin,
        encoding: &'static Encoding,
        diagnostic: Option<String>,
    ) -> Self {
        Self {
            raw,
            absolute,
            kind,
            depth,
            parent,
            base_ref,
            line,
            column,
            name,
            origin,
            encoding,
            diagnostic,
            outcome: None,
        }
    }

    /// The text a check operates on: the resolved absolute form when one
    /// exists, otherwise the raw text
    pub fn target(&self) -> &str {
        self.absolute.as_deref().unwrap_or(&self.raw)
    }

    /// The raw source text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The resolved absolute text, if resolution succeeded
    pub fn absolute(&self) -> Option<&str> {
        self.absolute.as_deref()
    }

    /// Protocol variant of this reference
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// Hop count from the original seed
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Parent back-link, if this reference was discovered
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Base reference declared by the parent document
    pub fn base_ref(&self) -> Option<&str> {
        self.base_ref.as_deref()
    }

    /// Source position within the parent document
    pub fn position(&self) -> (u32, u32) {
        (self.line, self.column)
    }

    /// Display name of the link
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operator-supplied or discovered
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Encoding used to decode byte input for this reference
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Diagnostic attached at build time, if any
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Recorded outcome, if the reference has been checked
    pub fn outcome(&self) -> Option<&CheckOutcome> {
        self.outcome.as_ref()
    }

    /// Takes the recorded outcome out of the reference when it is retired
    /// into the result log
    pub(crate) fn take_outcome(&mut self) -> Option<CheckOutcome> {
        self.outcome.take()
    }

    /// Records the check outcome
    ///
    /// A reference is checked at most once; a second recording is a caller
    /// defect and is logged, keeping the first outcome.
    pub fn record_outcome(&mut self, outcome: CheckOutcome) {
        if self.outcome.is_some() {
            tracing::warn!("Outcome already recorded for {}, keeping first", self.target());
            return;
        }
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_reference(kind: LinkKind) -> Reference {
        Reference::new(
            "http://example.com/".to_string(),
            Some("http://example.com/".to_string()),
            kind,
            0,
            None,
            None,
            0,
            0,
            String::new(),
            Origin::OperatorSupplied,
            encoding_rs::ISO_8859_15,
            None,
        )
    }

    #[test]
    fn test_target_prefers_absolute() {
        let r = minimal_reference(LinkKind::Http);
        assert_eq!(r.target(), "http://example.com/");

        let r2 = Reference::new(
            "somefile.txt".to_string(),
            None,
            LinkKind::File,
            0,
            None,
            None,
            0,
            0,
            String::new(),
            Origin::OperatorSupplied,
            encoding_rs::ISO_8859_15,
            None,
        );
        assert_eq!(r2.target(), "somefile.txt");
    }

    #[test]
    fn test_outcome_recorded_once() {
        let mut r = minimal_reference(LinkKind::Http);
        r.record_outcome(CheckOutcome::Valid { info: None });
        r.record_outcome(CheckOutcome::Skipped {
            reason: "late".to_string(),
        });

        assert!(matches!(r.outcome(), Some(CheckOutcome::Valid { .. })));
    }

    #[test]
    fn test_problem_outcomes() {
        assert!(CheckOutcome::Invalid {
            diagnostic: "x".to_string()
        }
        .is_problem());
        assert!(CheckOutcome::Failed(crate::CheckError::Timeout {
            url: "http://example.com/".to_string()
        })
        .is_problem());
        assert!(!CheckOutcome::Valid { info: None }.is_problem());
        assert!(!CheckOutcome::Skipped {
            reason: "x".to_string()
        }
        .is_problem());
    }
}
