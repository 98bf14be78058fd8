//! Input sanitization helpers.
//!
//! All user-supplied free text passes through these before storage. HTML is
//! stripped rather than escaped because the API never renders stored text as
//! markup; clients treat every field as plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Remove HTML tags from a string.
pub fn strip_html(input: &str) -> String {
    HTML_TAG.replace_all(input, "").into_owned()
}

/// Truncate a string to at most `max` characters, respecting char boundaries.
pub fn limit_len(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

/// Strip HTML, trim whitespace, and enforce a length limit in one pass.
pub fn clean_text(input: &str, max: usize) -> String {
    limit_len(strip_html(input).trim(), max)
}

/// Clean an optional field, mapping empty results to `None`.
pub fn clean_opt(input: Option<&str>, max: usize) -> Option<String> {
    input.map(|s| clean_text(s, max)).filter(|s| !s.is_empty())
}

/// Clean an optional URL field. Only http(s) URLs are kept; anything else
/// (including `javascript:` and `data:` schemes) maps to `None`.
pub fn clean_url(input: Option<&str>, max: usize) -> Option<String> {
    clean_opt(input, max)
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
}

/// Sanitize a tag list: strip markup, drop empties, cap count.
pub fn clean_tags(tags: Vec<String>, max_len: usize, max_count: usize) -> Vec<String> {
    tags.into_iter()
        .map(|t| clean_text(&t, max_len))
        .filter(|t| !t.is_empty())
        .take(max_count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_tags() {
        assert_eq!(strip_html("<b>hello</b> world"), "hello world");
        assert_eq!(strip_html("<script>alert(1)</script>"), "alert(1)");
        assert_eq!(strip_html("no markup"), "no markup");
    }

    #[test]
    fn test_limit_len_char_boundary() {
        assert_eq!(limit_len("héllo", 2), "hé");
        assert_eq!(limit_len("short", 100), "short");
    }

    #[test]
    fn test_clean_text_trims_and_limits() {
        assert_eq!(clean_text("  <i>wool</i> coat  ", 50), "wool coat");
        assert_eq!(clean_text("abcdef", 3), "abc");
    }

    #[test]
    fn test_clean_opt_drops_empty() {
        assert_eq!(clean_opt(Some("<p></p>"), 10), None);
        assert_eq!(clean_opt(Some(" ok "), 10), Some("ok".to_string()));
        assert_eq!(clean_opt(None, 10), None);
    }

    #[test]
    fn test_clean_url_requires_http_scheme() {
        assert_eq!(
            clean_url(Some("https://cdn.example.com/a.jpg"), 500),
            Some("https://cdn.example.com/a.jpg".to_string())
        );
        assert_eq!(
            clean_url(Some("http://cdn.example.com/a.jpg"), 500),
            Some("http://cdn.example.com/a.jpg".to_string())
        );
        assert_eq!(clean_url(Some("javascript:alert(1)"), 500), None);
        assert_eq!(clean_url(Some("data:image/png;base64,AAAA"), 500), None);
        assert_eq!(clean_url(Some("ftp://host/a.jpg"), 500), None);
        assert_eq!(clean_url(None, 500), None);
    }

    #[test]
    fn test_clean_tags_caps_count_and_drops_empty() {
        let tags: Vec<String> = (0..15).map(|i| format!("tag{}", i)).collect();
        let cleaned = clean_tags(tags, 30, 10);
        assert_eq!(cleaned.len(), 10);

        let cleaned = clean_tags(vec!["<b></b>".to_string(), "wool".to_string()], 30, 10);
        assert_eq!(cleaned, vec!["wool"]);
    }
}
