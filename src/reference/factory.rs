//! Reference resolution, classification and construction
//!
//! The factory turns raw link text plus discovery context into a typed
//! [`Reference`]: it resolves an absolute form from the candidate locations,
//! dispatches on the scheme registry and the ignored-scheme filter, and
//! triggers the automatic scope registration for the first operator seed.

use crate::reference::{Origin, ParentLink, Reference};
use crate::scheme::{self, LinkKind};
use crate::scope::ScopeSet;
use encoding_rs::Encoding;
use std::borrow::Cow;
use url::Url;

/// Policy switch: treat an operator-supplied reference with no resolvable
/// scheme as a local file. This is a convenience heuristic, not a semantic
/// necessity; disabling it makes such references inert error variants.
pub const ASSUME_LOCAL_FILE_FOR_OPERATOR_INPUT: bool = true;

/// Diagnostic carried by the inert error variant
const UNSUPPORTED_SCHEME: &str = "unsupported or unresolved scheme";

/// Decodes raw byte input with the given fallback encoding
///
/// Lossy by policy: undecodable sequences are replaced rather than failing,
/// so a badly encoded document still yields checkable references.
pub fn decode_with<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    let (decoded, _, _) = encoding.decode(bytes);
    decoded
}

/// Returns true if the text already carries a scheme (RFC 3986 shape)
fn is_scheme_bearing(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for c in chars {
        match c {
            ':' => return true,
            c if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') => {}
            _ => return false,
        }
    }
    false
}

/// Resolves the absolute reference text used for variant dispatch
///
/// Precedence: the link-tag-declared location first, then the document's
/// declared base, then the parent document location. The first candidate that
/// already carries a scheme wins. Returns `None` when no candidate qualifies;
/// absolute resolution is then the responsibility of an upstream content
/// parser, not this component.
///
/// The entire winning string is folded to lowercase before dispatch. This
/// also lowercases path segments, which can misclassify case-sensitive server
/// paths; it is replicated from the original behavior for compatibility and
/// is a known imprecision, not intended semantics.
pub fn resolve_absolute(
    from_tag: Option<&str>,
    from_base: Option<&str>,
    from_parent: Option<&str>,
) -> Option<String> {
    [from_tag, from_base, from_parent]
        .into_iter()
        .flatten()
        .find(|candidate| is_scheme_bearing(candidate))
        .map(str::to_lowercase)
}

/// Joins a relative reference against the declared base or parent location
///
/// This produces the reference's check identity; variant dispatch goes
/// through [`resolve_absolute`] instead. Returns `None` when no context is
/// present or none parses as a URL; the raw text then stands as identity.
fn join_relative(raw: &str, from_base: Option<&str>, from_parent: Option<&str>) -> Option<String> {
    [from_base, from_parent]
        .into_iter()
        .flatten()
        .find_map(|context| {
            let joined = Url::parse(context).ok()?.join(raw).ok()?;
            Some(joined.to_string())
        })
}

/// Discovery context for building a reference
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildContext<'a> {
    /// Location of the parent document
    pub parent_url: Option<&'a str>,
    /// Base reference declared by the parent document
    pub base_ref: Option<&'a str>,
    /// Source line within the parent document
    pub line: u32,
    /// Source column within the parent document
    pub column: u32,
    /// Display name of the link
    pub name: &'a str,
    /// Parent display name, carried into the back-link
    pub parent_name: &'a str,
}

/// Resolves, classifies and constructs a reference
///
/// Dispatch order, first match wins: the scheme registry, then the
/// ignored-scheme filter, then the operator-input heuristic
/// ([`ASSUME_LOCAL_FILE_FOR_OPERATOR_INPUT`]), and finally the inert error
/// variant. Dispatch text and check identity are separate: the dispatch
/// candidate may be the parent's own location, while identity for a relative
/// reference is the raw text joined against the base or parent, so two
/// distinct relative children of one page stay distinct.
///
/// Side effect: an operator-supplied reference built while the scope set is
/// still empty registers an intern rule derived from itself, so an
/// unconfigured run treats its seeds as the checked boundary.
pub fn build_reference(
    raw: &str,
    depth: u32,
    origin: Origin,
    ctx: &BuildContext<'_>,
    scope: &mut ScopeSet,
    encoding: &'static Encoding,
) -> Reference {
    let dispatch = resolve_absolute(Some(raw), ctx.base_ref, ctx.parent_url);
    let operator = origin == Origin::OperatorSupplied;

    let (kind, diagnostic) = match dispatch.as_deref() {
        Some(abs) => {
            if let Some(kind) = scheme::lookup(abs) {
                (kind, None)
            } else if scheme::is_ignored_scheme(abs) {
                (LinkKind::Ignored, None)
            } else if operator && ASSUME_LOCAL_FILE_FOR_OPERATOR_INPUT {
                (LinkKind::File, None)
            } else {
                (LinkKind::Error, Some(UNSUPPORTED_SCHEME.to_string()))
            }
        }
        None => {
            if operator && ASSUME_LOCAL_FILE_FOR_OPERATOR_INPUT {
                (LinkKind::File, None)
            } else {
                (LinkKind::Error, Some(UNSUPPORTED_SCHEME.to_string()))
            }
        }
    };

    let absolute = if is_scheme_bearing(raw) {
        dispatch
    } else {
        join_relative(raw, ctx.base_ref, ctx.parent_url)
    };

    if operator && scope.is_empty() {
        let seed_text = absolute.as_deref().unwrap_or(raw);
        scope.register_seed(seed_text, kind);
    }

    let parent = ctx.parent_url.map(|url| ParentLink {
        url: url.to_string(),
        name: ctx.parent_name.to_string(),
    });

    tracing::debug!(
        "Built {} reference for {:?} at depth {}",
        kind,
        absolute.as_deref().unwrap_or(raw),
        depth
    );

    Reference::new(
        raw.to_string(),
        absolute,
        kind,
        depth,
        parent,
        ctx.base_ref.map(str::to_string),
        ctx.line,
        ctx.column,
        ctx.name.to_string(),
        origin,
        encoding,
        diagnostic,
    )
}
