//! Shared utility functions.

use std::borrow::Cow;

/// Shorten `s` to at most `max_chars` characters, marking the cut with `…`.
///
/// Counts `char`s, not bytes, so multi-byte text is never split. Strings
/// that already fit are borrowed unchanged.
pub fn ellipsize(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        None => Cow::Borrowed(s),
        Some(_) if max_chars == 0 => Cow::Borrowed(""),
        Some(_) => {
            let keep = s
                .char_indices()
                .nth(max_chars - 1)
                .map_or(s.len(), |(idx, _)| idx);
            Cow::Owned(format!("{}…", &s[..keep]))
        }
    }
}

/// First non-empty line of `s`, trimmed.
pub fn first_line(s: &str) -> &str {
    s.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipsize_short_is_borrowed() {
        assert!(matches!(ellipsize("stack A B", 20), Cow::Borrowed("stack A B")));
        assert_eq!(ellipsize("exact", 5), "exact");
    }

    #[test]
    fn ellipsize_long_keeps_budget() {
        let out = ellipsize("PRECONDITION FAILED: (clear B)", 12);
        assert_eq!(out, "PRECONDITIO…");
        assert_eq!(out.chars().count(), 12);
    }

    #[test]
    fn ellipsize_multibyte() {
        assert_eq!(ellipsize("あのねあのね", 3), "あの…");
    }

    #[test]
    fn ellipsize_zero() {
        assert_eq!(ellipsize("abc", 0), "");
    }

    #[test]
    fn first_line_skips_blank_lines() {
        assert_eq!(first_line("\n\n  Error: bad  \nmore"), "Error: bad");
        assert_eq!(first_line(""), "");
    }
}
