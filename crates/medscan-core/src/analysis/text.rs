//! Case-insensitive keyword search and char-bounded slicing.
//!
//! All keyword tables are ASCII, so searching in an ASCII-lowercased copy
//! keeps byte offsets identical to the original text.

/// Lowercase ASCII letters only, preserving byte offsets.
pub(crate) fn fold(text: &str) -> String {
    text.to_ascii_lowercase()
}

/// True if any term occurs in the folded text.
pub(crate) fn contains_any(folded: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| folded.contains(term))
}

/// First term (in table order) that occurs, with its byte offset.
pub(crate) fn find_first<'t>(folded: &str, terms: &[&'t str]) -> Option<(usize, &'t str)> {
    terms
        .iter()
        .find_map(|term| folded.find(term).map(|idx| (idx, *term)))
}

/// Number of chars before a byte offset.
pub(crate) fn char_offset(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

/// Slice by char positions, clamped to the text.
pub(crate) fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    let from = byte_at(start);
    let to = byte_at(end.max(start));
    &text[from..to]
}

/// First `n` chars.
pub(crate) fn head_chars(text: &str, n: usize) -> &str {
    slice_chars(text, 0, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_first_uses_table_order() {
        let folded = fold("Impression: mild. Finding: nodule.");
        let hit = find_first(&folded, &["finding", "impression"]);
        assert_eq!(hit, Some((18, "finding")));
    }

    #[test]
    fn test_slice_chars_multibyte() {
        let text = "héllo wörld";
        assert_eq!(slice_chars(text, 1, 4), "éll");
        assert_eq!(head_chars(text, 100), text);
        assert_eq!(slice_chars(text, 8, 3), "");
    }

    #[test]
    fn test_fold_preserves_offsets() {
        let text = "Ärztlicher BEFUND: Lesion";
        let folded = fold(text);
        assert_eq!(folded.len(), text.len());
        let idx = folded.find("lesion").unwrap();
        assert_eq!(&text[idx..], "Lesion");
        assert_eq!(char_offset(text, idx), 19);
    }
}
