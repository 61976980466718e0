//! Small numeric helpers used across modules: rounding, display formatting and answer checks.

use crate::domain::Difficulty;
use crate::error::TrainerError;

/// Accepted distance between a submitted answer and the computed one.
pub const ANSWER_TOLERANCE: f64 = 0.01;

// Absorbs binary representation error, e.g. 42.01 - 42.00 = 0.0100000000000051.
const TOLERANCE_SLACK: f64 = 1e-9;

/// Round to two decimal places, half away from zero.
pub fn round_to_cents(x: f64) -> f64 {
  (x * 100.0).round() / 100.0
}

/// Render a number for display.
///
/// Integral values render without a fractional part. Fractional values render
/// with exactly two decimals at `Hard`; at the other levels only computed
/// answers can be fractional, and those use the shortest decimal form.
pub fn format_number(num: f64, difficulty: Difficulty) -> String {
  // Normalizes -0.
  let num = if num == 0.0 { 0.0 } else { num };
  if num.fract() == 0.0 {
    format!("{:.0}", num)
  } else if difficulty == Difficulty::Hard {
    format!("{:.2}", num)
  } else {
    num.to_string()
  }
}

/// Tolerance check used to judge a submission.
pub fn is_correct(candidate: f64, answer: f64) -> bool {
  (candidate - answer).abs() <= ANSWER_TOLERANCE + TOLERANCE_SLACK
}

/// Parse raw user input into a finite number.
pub fn parse_answer(raw: &str) -> Result<f64, TrainerError> {
  let s = raw.trim();
  if s.is_empty() {
    return Err(TrainerError::EmptyAnswer);
  }
  match s.parse::<f64>() {
    Ok(v) if v.is_finite() => Ok(v),
    _ => Err(TrainerError::UnparsableAnswer(trunc_for_log(s, 32))),
  }
}

/// Log-safe truncation for user supplied strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    None => s.to_string(),
    Some((idx, _)) => format!("{}… ({} bytes total)", &s[..idx], s.len()),
  }
}
