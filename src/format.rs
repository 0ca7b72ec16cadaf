use crate::state::app_settings::ScoreFormat;
use beatboard_api::{Score, ScoreEntry};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

pub const LEADERBOARD_HEADERS: [&str; 5] = ["Rank", "Avatar", "Name", "Total Score", "Play Count"];

pub const SCORE_HEADERS: [&str; 10] = [
    "Cover",
    "Song Name [Difficulty]",
    "Accuracy",
    "Time Set",
    "Bad Cuts",
    "Missed Notes",
    "Bomb Cuts",
    "Walls Hit",
    "Pauses",
    "Full Combo",
];

/// Filler for the eight score-dependent columns of an unplayed song.
pub const MISSING_SCORE_CELLS: [&str; 8] = ["No score yet", "-", "-", "-", "-", "-", "-", "-"];

/// Upper bound on fraction digits accepted by [`to_fixed`].
pub const MAX_FIXED_DECIMALS: usize = 100;

// An f64 never has more than 1074 significant fraction digits.
const EXACT_FRACTION_DIGITS: usize = 1100;

/// Fixed-point rendering that rounds an exact half away from zero instead of
/// to even, so `1234.125` at two places is `1234.13`.
///
/// Rounding works on the exact binary value, so `1.005` (stored just below
/// the half) still gives `1.00`.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string();
    }
    let decimals = decimals.min(MAX_FIXED_DECIMALS);

    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let (kept, dropped) = frac_part.split_at(decimals.min(frac_part.len()));

    let mut digits: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();
    if dropped.as_bytes().first().is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - kept.len();
    let mut out = String::with_capacity(digits.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|d| *d as char));
    if !kept.is_empty() {
        out.push('.');
        out.extend(digits[split..].iter().map(|d| *d as char));
    }
    out
}

pub fn format_total_score(raw: f64, format: ScoreFormat) -> String {
    to_fixed(raw * format.multiplier, format.decimals)
}

/// 0.9567 -> "95.67%"
pub fn format_accuracy(accuracy: f64) -> String {
    format!("{}%", to_fixed(accuracy * 100.0, 2))
}

pub fn format_timeset(score: &Score) -> String {
    format_timeset_in(score, &Local)
}

pub fn format_timeset_in<Tz>(score: &Score, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    score
        .set_at()
        .map(|t: DateTime<Utc>| t.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_full_combo(full_combo: bool) -> &'static str {
    if full_combo { "Yes" } else { "No" }
}

/// The eight cells after Cover and Song Name, for either a played or unplayed song.
pub fn score_cells(entry: &ScoreEntry) -> [String; 8] {
    match &entry.score {
        Some(score) => [
            format_accuracy(score.accuracy),
            format_timeset(score),
            score.bad_cuts.to_string(),
            score.missed_notes.to_string(),
            score.bomb_cuts.to_string(),
            score.walls_hit.to_string(),
            score.pauses.to_string(),
            format_full_combo(score.full_combo).to_string(),
        ],
        None => MISSING_SCORE_CELLS.map(str::to_string),
    }
}

pub fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let kept: String = name.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
