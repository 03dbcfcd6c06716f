//! Character-based length helpers.
//!
//! Thresholds count Unicode scalar values, never bytes, and cuts always land
//! on a character boundary.

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Longest prefix of `s` holding at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(char_len("résumé"), 6);
        assert_eq!("résumé".len(), 8);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("résumé", 2), "ré");
        assert_eq!(truncate_chars("résumé", 6), "résumé");
        assert_eq!(truncate_chars("résumé", 60), "résumé");
        assert_eq!(truncate_chars("abc", 0), "");
        assert_eq!(truncate_chars("", 3), "");
    }
}
