//! Pure transforms from raw catalog fields to display strings.
//!
//! Rounding behavior is deliberately uneven across fields: tempo rounds to
//! the nearest integer while the percentage fields and loudness truncate.
//! Changing one of these changes every table the bot has ever produced, so
//! keep the per-field behavior as is.

use chrono::NaiveDate;

/// Pitch-class names indexed by the raw key value.
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Mode names indexed by the raw mode value (0 = minor, 1 = major).
pub const MODE_NAMES: [&str; 2] = ["minor", "major"];

/// Combine pitch class and mode into a key signature like `C#major`.
///
/// Out-of-range values (the catalog reports key -1 when no key was
/// detected) contribute an empty segment instead of failing.
pub fn key_signature(key: i32, mode: i32) -> String {
    let pitch = usize::try_from(key)
        .ok()
        .and_then(|k| PITCH_CLASS_NAMES.get(k).copied())
        .unwrap_or("");
    let mode = usize::try_from(mode)
        .ok()
        .and_then(|m| MODE_NAMES.get(m).copied())
        .unwrap_or("");
    format!("{}{}", pitch, mode)
}

/// Tempo rounded to the nearest whole bpm.
pub fn tempo_bpm(tempo: f64) -> String {
    format!("{}bpm", tempo.round() as i64)
}

/// Milliseconds as an `M:SS` clock string.
pub fn duration_clock(duration_ms: u64) -> String {
    let minutes = duration_ms / 60_000;
    let seconds = (duration_ms / 1_000) % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Beats per bar as a time signature label.
pub fn time_signature_beats(time_signature: u32) -> String {
    format!("{}/4拍子", time_signature)
}

/// A 0..=1 fraction as a truncated whole percentage.
pub fn fraction_percent(value: f64) -> String {
    format!("{}%", (value * 100.0) as i64)
}

/// Popularity is already 0..=100; just append the unit.
pub fn popularity_percent(popularity: u32) -> String {
    format!("{}%", popularity)
}

/// Loudness in decibels, truncated toward zero.
pub fn loudness_db(loudness: f64) -> String {
    format!("{}dB", loudness as i64)
}

/// Parse a release date of calendar precision year, year-month or
/// year-month-day. Missing parts default to 01.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a release date as `YYYY年MM月DD日`.
///
/// Inputs that do not parse as a date are passed through unchanged rather
/// than aborting an otherwise complete table.
pub fn release_date_jp(raw: &str) -> String {
    match parse_release_date(raw) {
        Some(date) => date.format("%Y年%m月%d日").to_string(),
        None => raw.to_string(),
    }
}
