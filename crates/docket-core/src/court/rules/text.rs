//! Text normalization and case-insensitive search helpers.
//!
//! Keyword searches fold ASCII case only, so byte offsets found in the folded
//! text are valid offsets into the original.

/// Characters dropped by [`normalize`].
const STRIPPED: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '\\', '-', '_',
];

/// Canonicalize text for fuzzy comparison: lowercase, collapse whitespace,
/// strip common punctuation.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped: String = collapsed.chars().filter(|c| !STRIPPED.contains(c)).collect();
    // Stripping can leave edge or doubled spaces ("a - b"); collapse again
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle` in
/// `haystack` at or after `from`.
pub fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    if from > haystack.len() || !haystack.is_char_boundary(from) {
        return None;
    }
    let hay = haystack[from..].to_ascii_lowercase();
    hay.find(&needle.to_ascii_lowercase()).map(|pos| pos + from)
}

/// Byte offsets of every non-overlapping ASCII-case-insensitive occurrence
/// of `needle`. The haystack is folded once for the whole scan.
pub fn find_all_ci(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let folded = haystack.to_ascii_lowercase();
    folded
        .match_indices(&needle.to_ascii_lowercase())
        .map(|(pos, _)| pos)
        .collect()
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    find_ci(haystack, needle, 0).is_some()
}

/// Largest char boundary not greater than `index`.
pub fn floor_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Slice `[start - before, end + after]`, clamped to the text and to char
/// boundaries.
pub fn window(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let lo = floor_boundary(text, start.saturating_sub(before));
    let hi = floor_boundary(text, end.saturating_add(after));
    &text[lo..hi.max(lo)]
}

/// Length in characters, the unit lengths are compared in.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
