//! Operand and operator sampling.
//!
//! All randomness goes through [`RandomSource`], so a session can run on a
//! seeded or entropy-seeded `StdRng`, or on a scripted source in tests.

use rand::rngs::StdRng;
use rand::Rng;

use crate::domain::{Difficulty, Operator};
use crate::util::round_to_cents;

const EASY_BASES: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
const EASY_POWERS: [f64; 4] = [1.0, 10.0, 100.0, 1000.0];

/// Capability yielding uniform reals in `[0, 1)`.
pub trait RandomSource {
  fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
  fn next_unit(&mut self) -> f64 {
    self.gen::<f64>()
  }
}

/// Uniform index into a slice of `len` items. The clamp keeps a source that
/// returns exactly 1.0 in bounds.
fn pick_index(rng: &mut impl RandomSource, len: usize) -> usize {
  let i = (rng.next_unit() * len as f64).floor() as usize;
  i.min(len.saturating_sub(1))
}

fn pick<T: Copy>(rng: &mut impl RandomSource, items: &[T]) -> T {
  items[pick_index(rng, items.len())]
}

/// Draw one operand according to the difficulty rule.
pub fn generate_number(rng: &mut impl RandomSource, difficulty: Difficulty) -> f64 {
  match difficulty {
    Difficulty::Easy => {
      let base = pick(rng, &EASY_BASES);
      let power = pick(rng, &EASY_POWERS);
      base * power
    }
    Difficulty::Medium => (rng.next_unit() * 999.0).floor().min(998.0) + 1.0,
    Difficulty::Hard => round_to_cents(rng.next_unit() * 999.0 + 1.0),
  }
}

/// Draw one operator from the caller's allowed set.
///
/// Callers validate the set first; an empty slice yields `None`.
pub fn generate_operator(rng: &mut impl RandomSource, allowed: &[Operator]) -> Option<Operator> {
  if allowed.is_empty() {
    return None;
  }
  Some(pick(rng, allowed))
}

/// Replays a fixed list of unit values; used to force specific draws in tests.
#[cfg(test)]
pub struct ScriptedSource {
  values: std::collections::VecDeque<f64>,
}

#[cfg(test)]
impl ScriptedSource {
  pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
    Self { values: values.into_iter().collect() }
  }

  /// Unit value that makes a `Medium` draw produce exactly `n` (1..=999).
  pub fn medium(n: u32) -> f64 {
    (n as f64 - 0.5) / 999.0
  }

  /// Unit value selecting index `i` out of `len` items.
  pub fn index(i: usize, len: usize) -> f64 {
    (i as f64 + 0.5) / len as f64
  }

  pub fn remaining(&self) -> usize {
    self.values.len()
  }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
  fn next_unit(&mut self) -> f64 {
    self.values.pop_front().expect("scripted source exhausted")
  }
}
