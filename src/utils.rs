//! Small helpers shared across the pipeline: log truncation, whitespace
//! normalization, and word counting for analysis metrics.

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte count
/// indicator appended. Used when logging previews of scraped bodies and
/// model replies.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        // Back off to a char boundary so we never split a multibyte char.
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
///
/// Scraped element text is full of indentation and stray newlines; the
/// headline length filter wants the collapsed form.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count whitespace-separated words, the unit used by the summary
/// compression ratio and reading-time metrics.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}
