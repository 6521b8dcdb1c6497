//! Field extraction helpers for structured logging

use crate::fanout::BackendResult;

/// Truncate `text` to at most `max_chars` characters for a log preview.
///
/// Cuts on a char boundary and appends `...` when truncated.
///
/// # Examples
///
/// ```
/// use alert_receiver::logging::preview;
///
/// assert_eq!(preview("short", 10), "short");
/// assert_eq!(preview("abcdefghij", 4), "abcd...");
/// ```
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Count succeeded and failed backend results, as `(ok, failed)`.
pub fn outcome_counts(results: &[BackendResult]) -> (usize, usize) {
    let ok = results.iter().filter(|r| r.is_success()).count();
    (ok, results.len() - ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_multibyte_boundary() {
        let text = "αβγδε";
        assert_eq!(preview(text, 2), "αβ...");
        assert_eq!(preview(text, 5), "αβγδε");
    }

    #[test]
    fn test_preview_trims_whitespace() {
        assert_eq!(preview("  hi \n", 10), "hi");
        assert_eq!(preview("", 3), "");
    }

    #[test]
    fn test_outcome_counts() {
        let results = vec![
            BackendResult {
                provider: "a".to_string(),
                response: Some("ok".to_string()),
                ..Default::default()
            },
            BackendResult::synthetic("b", "openai", "boom"),
            BackendResult::synthetic("c", "ollama", "timeout"),
        ];
        assert_eq!(outcome_counts(&results), (1, 2));
        assert_eq!(outcome_counts(&[]), (0, 0));
    }
}
