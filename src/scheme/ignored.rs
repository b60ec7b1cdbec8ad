//! Static denylist of recognized-but-unchecked schemes
//!
//! These schemes are understood well enough to know we will never check them:
//! directory access, streaming, telephony, browser-internal tokens, and so on.
//! The filter is consulted only after the primary dispatch table fails.

/// Scheme tokens that produce the inert `Ignored` variant
const IGNORED_SCHEMES: &[&str] = &[
    "acap",            // application configuration access protocol
    "afs",             // Andrew File System global file names
    "cid",             // content identifier
    "data",            // inline data
    "dav",             // WebDAV
    "fax",             // fax
    "imap",            // internet message access protocol
    "ldap",            // Lightweight Directory Access Protocol
    "mailserver",      // access to data available from mail servers
    "mid",             // message identifier
    "mms",             // multimedia stream
    "modem",           // modem
    "nfs",             // network file system
    "opaquelocktoken", // WebDAV lock token
    "pop",             // Post Office Protocol v3
    "prospero",        // Prospero Directory Service
    "rsync",           // rsync protocol
    "rtsp",            // real time streaming protocol
    "rtspu",           // real time streaming protocol (UDP)
    "service",         // service location
    "shttp",           // secure HTTP
    "sip",             // session initiation protocol
    "tel",             // telephone
    "tip",             // Transaction Internet Protocol
    "tn3270",          // interactive 3270 emulation sessions
    "vemmi",           // versatile multimedia interface
    "wais",            // Wide Area Information Servers
    "z39.50r",         // Z39.50 retrieval
    "z39.50s",         // Z39.50 session
    "chrome",          // Mozilla specific
    "find",            // Mozilla specific
    "clsid",           // Microsoft specific
    "javascript",      // JavaScript
    "isbn",            // international book numbers
];

/// Returns true if the absolute text carries a recognized-but-unchecked scheme
///
/// Matching is scheme-prefix based against the already case-folded absolute
/// text: the token must be followed by a colon.
pub fn is_ignored_scheme(absolute: &str) -> bool {
    IGNORED_SCHEMES.iter().any(|token| {
        absolute.len() > token.len()
            && absolute.as_bytes()[token.len()] == b':'
            && absolute.starts_with(token)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tel_scheme_ignored() {
        assert!(is_ignored_scheme("tel:12345"));
    }

    #[test]
    fn test_javascript_scheme_ignored() {
        assert!(is_ignored_scheme("javascript:void(0)"));
    }

    #[test]
    fn test_dotted_token() {
        assert!(is_ignored_scheme("z39.50r:record"));
        assert!(is_ignored_scheme("z39.50s:session"));
    }

    #[test]
    fn test_colon_required() {
        // A bare prefix without the colon is not a scheme match
        assert!(!is_ignored_scheme("telnet://host"));
        assert!(!is_ignored_scheme("data"));
    }

    #[test]
    fn test_checked_schemes_not_ignored() {
        assert!(!is_ignored_scheme("http://example.com/"));
        assert!(!is_ignored_scheme("mailto:user@example.com"));
    }

    #[test]
    fn test_empty_input() {
        assert!(!is_ignored_scheme(""));
    }

    #[test]
    fn test_every_token_matches_itself() {
        for token in IGNORED_SCHEMES {
            let candidate = format!("{}:payload", token);
            assert!(is_ignored_scheme(&candidate), "token {} did not match", token);
        }
    }
}
