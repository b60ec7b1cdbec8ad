//! Intern/extern scope rules
//!
//! This module decides whether a reference lies inside or outside the
//! operator-defined checked boundary. Rules are compiled once from seed
//! references or configured patterns; the set is append-only before checking
//! starts and read-only afterwards.

use crate::scheme::LinkKind;
use crate::{ConfigError, ConfigResult};
use regex::Regex;

/// Which side of the checked boundary a reference falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Inside the checked boundary
    Intern,
    /// Outside the checked boundary
    Extern,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intern => f.write_str("intern"),
            Self::Extern => f.write_str("extern"),
        }
    }
}

/// One compiled scope rule: a pattern plus its polarity
#[derive(Debug, Clone)]
pub struct ScopeRule {
    pattern: Regex,
    polarity: Scope,
}

impl ScopeRule {
    /// Compiles a rule from a user-supplied pattern
    ///
    /// The pattern is a regular expression matched unanchored against the
    /// resolved absolute text of a reference.
    pub fn new(pattern: &str, polarity: Scope) -> ConfigResult<Self> {
        let compiled = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            pattern: compiled,
            polarity,
        })
    }

    /// Returns true if the rule matches the given absolute text
    pub fn matches(&self, absolute: &str) -> bool {
        self.pattern.is_match(absolute)
    }

    /// The rule's polarity
    pub fn polarity(&self) -> Scope {
        self.polarity
    }

    /// The source pattern, for reporting
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// The full rule set used to classify references
///
/// Matching is a logical OR across all rules of the same polarity. Explicit
/// extern rules win over intern rules; a reference matching nothing is extern.
#[derive(Debug, Default)]
pub struct ScopeSet {
    intern: Vec<ScopeRule>,
    extern_rules: Vec<ScopeRule>,
}

impl ScopeSet {
    /// Creates an empty scope set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no rule of either polarity has been registered
    pub fn is_empty(&self) -> bool {
        self.intern.is_empty() && self.extern_rules.is_empty()
    }

    /// Number of rules of each polarity, for reporting
    pub fn rule_counts(&self) -> (usize, usize) {
        (self.intern.len(), self.extern_rules.len())
    }

    /// Appends a compiled rule
    pub fn add_rule(&mut self, rule: ScopeRule) {
        match rule.polarity() {
            Scope::Intern => self.intern.push(rule),
            Scope::Extern => self.extern_rules.push(rule),
        }
    }

    /// Derives and registers an intern rule from a seed reference
    ///
    /// For the file variant the rule is coarse: every `file:` reference is
    /// intern. For the http/https/ftp family the host is extracted from the
    /// absolute text, IDNA-encoded, escaped for literal use and anchored as a
    /// prefix rule. A host that cannot be IDNA-encoded registers no rule and
    /// does not raise.
    pub fn register_seed(&mut self, absolute: &str, kind: LinkKind) {
        if kind == LinkKind::File {
            tracing::debug!("Registering intern rule for file references");
            self.push_literal_prefix("file:");
            return;
        }

        if !kind.uses_host_scope() {
            return;
        }

        let Some(host) = host_of(absolute) else {
            tracing::debug!("No host in seed {}, no scope rule registered", absolute);
            return;
        };

        let encoded = match idna::domain_to_ascii(host) {
            Ok(encoded) => encoded,
            Err(e) => {
                // Silent per contract: an unencodable seed host simply
                // contributes no rule.
                tracing::debug!("IDNA encoding failed for {}: {:?}", host, e);
                return;
            }
        };

        let scheme = absolute.split(':').next().unwrap_or_default();
        let prefix = format!("{}://{}", scheme, encoded);
        tracing::debug!("Registering intern rule for prefix {}", prefix);
        self.push_literal_prefix(&prefix);
    }

    /// Classifies an absolute reference text against the rule set
    ///
    /// Pure and deterministic: no I/O, same answer for the same seed set.
    pub fn classify(&self, absolute: &str) -> Scope {
        if self.extern_rules.iter().any(|r| r.matches(absolute)) {
            return Scope::Extern;
        }
        if self.intern.iter().any(|r| r.matches(absolute)) {
            return Scope::Intern;
        }
        Scope::Extern
    }

    fn push_literal_prefix(&mut self, prefix: &str) {
        let anchored = format!("^{}", regex::escape(prefix));
        match ScopeRule::new(&anchored, Scope::Intern) {
            Ok(rule) => self.intern.push(rule),
            // Unreachable for an escaped literal, but do not panic the run
            // over a scope rule.
            Err(e) => tracing::warn!("Could not compile seed scope rule: {}", e),
        }
    }
}

/// Extracts the network-location host from an absolute reference text
///
/// Works on the raw string rather than a parsed URL so that seeds the `url`
/// crate would reject still contribute their host to IDNA encoding (which then
/// decides whether a rule is registered).
fn host_of(absolute: &str) -> Option<&str> {
    let rest = absolute.split_once("://")?.1;
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|a| !a.is_empty())?;
    // Strip userinfo and port
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}
