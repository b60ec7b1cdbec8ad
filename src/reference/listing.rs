//! Synthetic listing generation
//!
//! Produces a minimal HTML document wrapping one link element per input
//! reference, used to seed a run from a flat list. Label and href are escaped
//! independently so the output is safe to reparse regardless of input content.
//! Not on the check hot path.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unencoded in hrefs: unreserved marks plus the path
/// separator, matching conventional URL quoting
const HREF_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Escapes markup-significant characters for text and attribute positions
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Builds a synthetic listing document from ordered raw references
///
/// Each entry becomes one link element: the visible label is entity-escaped,
/// the href is percent-encoded and then entity-escaped for attribute position.
pub fn build_listing<S: AsRef<str>>(references: &[S]) -> String {
    let mut lines = vec!["<html>".to_string(), "<body>".to_string()];
    for entry in references {
        let entry = entry.as_ref();
        let name = escape_html(entry);
        let href = escape_html(&utf8_percent_encode(entry, HREF_SAFE).to_string());
        lines.push(format!("<a href=\"{}\">{}</a>", href, name));
    }
    lines.push("</body>".to_string());
    lines.push("</html>".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_sections() {
        let doc = build_listing::<&str>(&[]);
        assert_eq!(doc, "<html>\n<body>\n</body>\n</html>");
    }

    #[test]
    fn test_one_link_per_entry() {
        let doc = build_listing(&["http://a.example/", "http://b.example/"]);
        assert_eq!(doc.matches("<a href=").count(), 2);
    }

    #[test]
    fn test_labels_escaped() {
        let doc = build_listing(&["a&b", "<script>"]);

        // No unescaped markup characters may survive in label position
        let labels: Vec<&str> = doc
            .lines()
            .filter(|l| l.starts_with("<a "))
            .map(|l| {
                let start = l.find('>').unwrap() + 1;
                let end = l.rfind("</a>").unwrap();
                &l[start..end]
            })
            .collect();

        assert_eq!(labels, vec!["a&amp;b", "&lt;script&gt;"]);
        for label in labels {
            let unescaped = label.replace("&amp;", "").replace("&lt;", "").replace("&gt;", "");
            assert!(!unescaped.contains(['<', '>', '&']));
        }
    }

    #[test]
    fn test_href_percent_encoded() {
        let doc = build_listing(&["http://example.com/a b?q=1"]);
        assert!(doc.contains("href=\"http%3A//example.com/a%20b%3Fq%3D1\""));
    }

    #[test]
    fn test_href_safe_characters_preserved() {
        let doc = build_listing(&["path/to/file-name_v2.txt~"]);
        assert!(doc.contains("href=\"path/to/file-name_v2.txt~\""));
    }

    #[test]
    fn test_output_reparses_cleanly() {
        let doc = build_listing(&["<>&\"", "a&b"]);
        // Strip the known-good tags; nothing rawer than entities may remain
        let body = doc
            .replace("<html>", "")
            .replace("</html>", "")
            .replace("<body>", "")
            .replace("</body>", "");
        for line in body.lines().filter(|l| !l.is_empty()) {
            assert!(line.starts_with("<a href=\""));
            assert!(line.ends_with("</a>"));
        }
    }
}
