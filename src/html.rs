//! HTML escaping and HTML-to-text conversion for plain-text mail bodies.

use regex::Regex;

/// Escape a string for safe inclusion in HTML text content.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Derive a plain-text rendition of an HTML body.
///
/// Scripts and styles are dropped entirely, `<br>` and `</p>` become
/// newlines, remaining tags are stripped and common entities decoded.
pub fn html_to_text(html: &str) -> String {
    let re = |pattern: &str| Regex::new(pattern).expect("valid pattern");

    let text = re(r"(?is)<script[^>]*>.*?</script>").replace_all(html, "");
    let text = re(r"(?is)<style[^>]*>.*?</style>").replace_all(&text, "");
    let text = re(r"(?i)<br\s*/?>").replace_all(&text, "\n");
    let text = re(r"(?i)</p>").replace_all(&text, "\n");
    let text = re(r"<[^>]+>").replace_all(&text, "");

    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}
