//! Scoring-response parsing.
//!
//! Accepted forms, in order:
//! 1. A bare `0`-`3` digit.
//! 2. `Score: N` optionally followed by `Explanation: ...`; the first digit
//!    after `Score:` is read and clamped to `0..=3`.
//!
//! Anything else is unparseable; the caller degrades to the neutral score
//! and keeps the raw text for diagnosis.

/// Parses a scoring response into `(score, explanation)`.
pub fn parse_score_response(raw: &str) -> Option<(u8, String)> {
    let trimmed = raw.trim();

    if trimmed.len() == 1 {
        if let Some(digit) = trimmed.chars().next().and_then(|c| c.to_digit(10)) {
            if digit <= 3 {
                return Some((digit as u8, String::new()));
            }
        }
        return None;
    }

    let score_pos = trimmed.find("Score:")?;
    let after_score = &trimmed[score_pos + "Score:".len()..];
    let digit = after_score
        .chars()
        .find(char::is_ascii_digit)
        .and_then(|c| c.to_digit(10))?;
    let score = (digit as u8).min(3);

    let explanation = trimmed
        .find("Explanation:")
        .map(|pos| trimmed[pos + "Explanation:".len()..].trim().to_string())
        .unwrap_or_default();

    Some((score, explanation))
}
