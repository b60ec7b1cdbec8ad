use crate::scope::{Scope, ScopeRule, ScopeSet};
use crate::ConfigResult;
use encoding_rs::Encoding;
use serde::Deserialize;

/// Main configuration structure for linkscout
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub checker: CheckerConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
}

/// Checker behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckerConfig {
    /// Maximum recursion depth from seed references; -1 means unbounded
    #[serde(rename = "recursion-depth", default = "default_recursion_depth")]
    pub recursion_depth: i64,

    /// Whether periodic status reporting is enabled
    #[serde(default = "default_status")]
    pub status: bool,

    /// Fallback encoding label used to decode byte input
    #[serde(rename = "fallback-encoding", default = "default_fallback_encoding")]
    pub fallback_encoding: String,
}

fn default_recursion_depth() -> i64 {
    -1
}

fn default_status() -> bool {
    true
}

fn default_fallback_encoding() -> String {
    "ISO-8859-15".to_string()
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            recursion_depth: default_recursion_depth(),
            status: default_status(),
            fallback_encoding: default_fallback_encoding(),
        }
    }
}

/// Intern/extern scope rule patterns
///
/// Ordered sequences of regular expressions matched against the resolved
/// absolute text of each reference.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScopeConfig {
    /// Patterns marking references as inside the checked boundary
    #[serde(rename = "internlinks", default)]
    pub intern_links: Vec<String>,

    /// Patterns marking references as outside the checked boundary
    #[serde(rename = "externlinks", default)]
    pub extern_links: Vec<String>,
}

impl Config {
    /// Resolves the configured fallback encoding
    ///
    /// Validation has already checked the label, so an unknown label here
    /// falls back to the default rather than failing mid-run.
    pub fn fallback_encoding(&self) -> &'static Encoding {
        Encoding::for_label(self.checker.fallback_encoding.as_bytes())
            .unwrap_or(encoding_rs::ISO_8859_15)
    }

    /// Compiles the configured scope patterns into a rule set
    pub fn compile_scope_rules(&self) -> ConfigResult<ScopeSet> {
        let mut set = ScopeSet::new();
        for pattern in &self.scope.intern_links {
            set.add_rule(ScopeRule::new(pattern, Scope::Intern)?);
        }
        for pattern in &self.scope.extern_links {
            set.add_rule(ScopeRule::new(pattern, Scope::Extern)?);
        }
        Ok(set)
    }
}
