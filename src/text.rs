//! Comparison-text helpers shared by every matcher.
//!
//! All matching in this crate is done against lowercased text built from the
//! subject and a bounded prefix of the body. Prefix lengths are counted in
//! characters, not bytes, so a multi-byte character is never split.

/// Body prefix inspected by the spam heuristics and company extraction.
pub const SPAM_SCAN_CHARS: usize = 500;

/// Body prefix inspected by the category classifier.
pub const CATEGORY_SCAN_CHARS: usize = 1000;

pub fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

/// First `max_chars` characters of `text`.
pub fn prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// `lower(subject) + " " + first max_chars of lower(body)`.
pub fn comparison_text(subject: &str, body: &str, max_chars: usize) -> String {
    let body_lower = lowercase(body);
    format!("{} {}", lowercase(subject), prefix(&body_lower, max_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_counts_characters() {
        assert_eq!(prefix("réduction", 2), "ré");
        assert_eq!(prefix("abc", 10), "abc");
        assert_eq!(prefix("", 5), "");
        assert_eq!(prefix("abc", 0), "");
    }

    #[test]
    fn test_comparison_text_lowercases_and_truncates() {
        let text = comparison_text("Votre CANDIDATURE", "ABCDEF", 3);
        assert_eq!(text, "votre candidature abc");
    }

    #[test]
    fn test_body_is_lowercased_before_truncation() {
        // 'İ' lowercases to two characters; the cap applies to the lowered body
        let text = comparison_text("", "İx", 1);
        assert_eq!(text, " i");
    }
}
