/*!
 * Timecode codec for annotation marks.
 *
 * Converts between millisecond positions and the `HH:MM:SS,mmm` display
 * form used in mark tables and CSV files. Decoding is deliberately
 * non-panicking: malformed text yields the sentinel `-1`, which compares
 * below every real position.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel returned by [`decode`] for text that is not a valid timecode.
pub const INVALID_MS: i64 = -1;

// @const: Timecode shape regex (hours are unbounded, not clamped to 24)
static TIMECODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2}),(\d{1,3})$").unwrap()
});

/// Format a millisecond position as `HH:MM:SS,mmm`.
///
/// Fields are zero-padded; the hour field grows past two digits when
/// needed instead of wrapping.
pub fn encode(ms: i64) -> String {
    let ms = ms.max(0);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse a `HH:MM:SS,mmm` timecode to milliseconds.
///
/// Returns [`INVALID_MS`] for anything that does not match the shape:
/// exactly one comma splitting the millisecond part from the time part,
/// exactly two colons inside the time part, all fields numeric. The
/// accepted shapes are slightly lax: the hour field takes any number of
/// digits, minute and second take one or two, milliseconds one to three
/// (`"1:2:3,45"` parses as 3723045 ms); field values are not
/// range-checked. Hour fields too large to fit the arithmetic are
/// malformed. Never panics.
pub fn decode(text: &str) -> i64 {
    let Some(caps) = TIMECODE_REGEX.captures(text.trim()) else {
        return INVALID_MS;
    };

    let field = |idx: usize| -> Option<i64> { caps.get(idx)?.as_str().parse().ok() };
    match (field(1), field(2), field(3), field(4)) {
        (Some(h), Some(m), Some(s), Some(ms)) => h
            .checked_mul(60)
            .and_then(|v| v.checked_add(m))
            .and_then(|v| v.checked_mul(60))
            .and_then(|v| v.checked_add(s))
            .and_then(|v| v.checked_mul(1_000))
            .and_then(|v| v.checked_add(ms))
            .unwrap_or(INVALID_MS),
        // Hour fields with more digits than i64 holds fail the parse
        _ => INVALID_MS,
    }
}
