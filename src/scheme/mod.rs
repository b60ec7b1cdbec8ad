//! Scheme registry and variant classification
//!
//! This module maps scheme tokens to checker variants. The registry is a
//! static table built once and immutable for the run; adding a protocol means
//! adding a variant and a table row, not editing scattered conditionals.

mod ignored;

pub use ignored::is_ignored_scheme;

/// Protocol variant attached to a reference
///
/// The closed set of checker behaviors. `Ignored` and `Error` are the inert
/// variants: they are logged but never handed to a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Http,
    Https,
    Ftp,
    File,
    Telnet,
    MailTo,
    Gopher,
    Nntp,
    /// Recognized but deliberately unchecked scheme
    Ignored,
    /// Unsupported or unresolved scheme; reportable, never checked
    Error,
}

impl LinkKind {
    /// Returns true if this variant may be handed to a transport
    pub fn is_checkable(&self) -> bool {
        !matches!(self, Self::Ignored | Self::Error)
    }

    /// Returns true if a seed of this variant contributes a host-based
    /// scope rule
    pub fn uses_host_scope(&self) -> bool {
        matches!(self, Self::Http | Self::Https | Self::Ftp)
    }

    /// Short lowercase label for logging and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Ftp => "ftp",
            Self::File => "file",
            Self::Telnet => "telnet",
            Self::MailTo => "mailto",
            Self::Gopher => "gopher",
            Self::Nntp => "nntp",
            Self::Ignored => "ignored",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Scheme dispatch table, first match wins
///
/// Tokens are colon-terminated prefixes of the case-folded absolute text, so
/// `http:` cannot shadow `https:`. Order is significant and mirrors the
/// dispatch order of the reference resolver.
const SCHEME_TABLE: &[(&str, LinkKind)] = &[
    ("http:", LinkKind::Http),
    ("ftp:", LinkKind::Ftp),
    ("file:", LinkKind::File),
    ("telnet:", LinkKind::Telnet),
    ("mailto:", LinkKind::MailTo),
    ("gopher:", LinkKind::Gopher),
    ("https:", LinkKind::Https),
    ("nntp:", LinkKind::Nntp),
    ("news:", LinkKind::Nntp),
    ("snews:", LinkKind::Nntp),
];

/// Looks up the variant for an absolute reference
///
/// Expects the already case-folded absolute text. Returns `None` when no
/// supported scheme token matches; the caller then consults the ignored-scheme
/// filter and the operator-input heuristic.
pub fn lookup(absolute: &str) -> Option<LinkKind> {
    SCHEME_TABLE
        .iter()
        .find(|(token, _)| absolute.starts_with(token))
        .map(|(_, kind)| *kind)
}
