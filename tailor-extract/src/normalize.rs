//! Plain-text rendering of an HTML document.
//!
//! The transform is textual, not structural: it never parses a DOM, so
//! malformed markup is handled the same way as well-formed markup.
use regex::Regex;
use std::sync::OnceLock;

static SCRIPT_BLOCK: OnceLock<Regex> = OnceLock::new();
static STYLE_BLOCK: OnceLock<Regex> = OnceLock::new();
static TAG: OnceLock<Regex> = OnceLock::new();
static WHITESPACE: OnceLock<Regex> = OnceLock::new();

/// The only entities decoded, applied in this order.
const ENTITIES: [(&str, &str); 5] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
];

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

/// Strip scripts, styles and tags, decode a handful of entities and collapse
/// whitespace.
///
/// ```
/// use tailor_extract::normalize;
///
/// let html = "<script>track()</script><p>Hello &amp; World</p>";
/// assert_eq!(normalize(html), "Hello & World");
/// assert_eq!(normalize("   "), "");
/// ```
pub fn normalize(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let text = compiled(&SCRIPT_BLOCK, r"(?is)<script[^>]*>.*?</script>").replace_all(html, " ");
    let text = compiled(&STYLE_BLOCK, r"(?is)<style[^>]*>.*?</style>").replace_all(&text, " ");
    let text = compiled(&TAG, r"<[^>]+>").replace_all(&text, " ");

    let mut text = text.into_owned();
    for (entity, decoded) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, decoded);
        }
    }

    compiled(&WHITESPACE, r"\s+")
        .replace_all(&text, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_inputs_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("\n\t \r\n"), "");
    }

    #[test]
    fn drops_script_and_style_bodies_across_lines_and_case() {
        let html = r#"<html><head>
            <STYLE type="text/css">
                body { color: red; }
            </STYLE>
            <Script src="x.js">
                window.jobs = [1, 2];
            </sCrIpT>
        </head><body><h1>Rust Engineer</h1></body></html>"#;
        assert_eq!(normalize(html), "Rust Engineer");
    }

    #[test]
    fn tags_become_word_breaks() {
        assert_eq!(normalize("<li>Rust</li><li>Tokio</li>"), "Rust Tokio");
        assert_eq!(normalize("Remote<br/>friendly"), "Remote friendly");
    }

    #[test]
    fn decodes_exactly_five_entities() {
        assert_eq!(
            normalize("a&nbsp;b &amp; c &lt;d&gt; &quot;e&quot;"),
            "a b & c <d> \"e\""
        );
        assert_eq!(normalize("&copy; 2025 &#39;x&#39; &apos;"), "&copy; 2025 &#39;x&#39; &apos;");
    }

    #[test]
    fn malformed_markup_does_not_panic() {
        assert_eq!(normalize("<div <span>text"), "text");
        assert_eq!(normalize("5 < 6"), "5 < 6");
        assert_eq!(normalize("7 > 3"), "7 > 3");
        assert_eq!(normalize("<script>never closed"), "never closed");
        assert_eq!(normalize("<<<>>>"), ">>");
    }

    #[test]
    fn real_tags_leave_no_delimiters_behind() {
        let html = "<div class=\"job\"><h2>Staff Engineer</h2>\n<p>Build <b>fast</b> systems.</p></div>";
        let out = normalize(html);
        assert_eq!(out, "Staff Engineer Build fast systems.");
        assert!(!out.contains('<') && !out.contains('>'));
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let html = "<main>\n  <h1>Data   Engineer</h1>\n<p>Salary: $120k &amp; equity</p>\n</main>";
        let once = normalize(html);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn unicode_whitespace_is_collapsed() {
        assert_eq!(normalize("Senior\u{00a0}\u{2003}Engineer\u{3000}"), "Senior Engineer");
    }
}
