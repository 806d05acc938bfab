use std::time::Duration;

use tracing::warn;

/// HTTP client with a whole-request timeout, built once per agent so
/// connections are pooled across calls.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "HTTP client builder failed, falling back to defaults");
            reqwest::Client::new()
        })
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a character.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
    &s[..end]
}

/// Unwrap a markdown code fence around a JSON answer.
///
/// The opening fence may carry any info string (```` ```json ````, ```` ```JSON ````);
/// everything up to the first newline is dropped with it.
pub fn strip_code_blocks(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match fenced.split_once('\n') {
        Some((_info, rest)) => rest,
        None => fenced.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        let text = "Água contaminada";
        assert_eq!(truncate_to_char_boundary(text, 2), "Á");
        assert_eq!(truncate_to_char_boundary(text, 1), "");
    }

    #[test]
    fn test_truncate_within_bounds() {
        assert_eq!(truncate_to_char_boundary("flood", 100), "flood");
    }

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_blocks("```JSON\n[]\n```"), "[]");
        assert_eq!(strip_code_blocks("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_blocks("```json{}```"), "{}");
        assert_eq!(strip_code_blocks("  {}  "), "{}");
    }
}
