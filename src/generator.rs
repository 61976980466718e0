//! Problem generation: sampling, the left-to-right fold, and display formatting.
//!
//! The fold is calculator style (no operator precedence):
//!   `12 + 30 * 2` evaluates as `(12 + 30) * 2`.
//! Division by zero keeps the running value; percentage of zero yields zero.

use std::collections::BTreeSet;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{Difficulty, Operator, Problem, Settings};
use crate::error::TrainerError;
use crate::sampler::{generate_number, generate_operator, RandomSource};
use crate::util::{format_number, round_to_cents};

pub const DEFAULT_SET_SIZE: usize = 10;
pub const MAX_SET_SIZE: usize = 100;

/// Apply one fold step.
pub fn apply(op: Operator, a: f64, b: f64) -> f64 {
  match op {
    Operator::Add => a + b,
    Operator::Sub => a - b,
    Operator::Mul => a * b,
    Operator::Div => {
      if b == 0.0 { a } else { round_to_cents(a / b) }
    }
    Operator::Percent => {
      if b == 0.0 { 0.0 } else { (a * b) / 100.0 }
    }
  }
}

/// `"Mixed Operations"` when more than one distinct operator is used.
pub fn operation_summary(operators: &[Operator]) -> String {
  let distinct: BTreeSet<Operator> = operators.iter().copied().collect();
  match distinct.len() {
    1 => distinct.iter().next().map(|op| op.name()).unwrap_or_default().to_string(),
    _ => "Mixed Operations".to_string(),
  }
}

/// Fold an already sampled sequence into a `Problem`.
///
/// Fails when `operands` is empty or the operator count is not `operands - 1`.
pub fn build_problem(difficulty: Difficulty, operands: Vec<f64>, operators: Vec<Operator>) -> Result<Problem, TrainerError> {
  let Some(&first) = operands.first() else {
    return Err(TrainerError::invalid("cannot build a problem from zero operands"));
  };
  if operators.len() + 1 != operands.len() {
    return Err(TrainerError::invalid(format!(
      "{} operands need {} operators, got {}",
      operands.len(),
      operands.len() - 1,
      operators.len()
    )));
  }

  let mut result = first;
  let mut display = format_number(first, difficulty);
  for (&op, &next) in operators.iter().zip(&operands[1..]) {
    let shown = format_number(next, difficulty);
    match op {
      Operator::Percent => {
        display.push_str(" × ");
        display.push_str(&shown);
        display.push('%');
      }
      _ => {
        display.push(' ');
        display.push_str(op.symbol());
        display.push(' ');
        display.push_str(&shown);
      }
    }
    result = apply(op, result, next);
  }
  display.push_str(" = ?");

  let answer = round_to_cents(result);
  // Finite operands and the zero fallbacks keep the fold finite.
  if !answer.is_finite() {
    return Err(TrainerError::invalid(format!("expression '{display}' did not produce a finite answer")));
  }

  Ok(Problem {
    id: Uuid::new_v4(),
    difficulty,
    operation_summary: operation_summary(&operators),
    operands,
    operators,
    display_text: display,
    answer,
  })
}

/// Generate one problem: all operands are drawn first, then the operators.
#[instrument(level = "debug", skip(rng), fields(difficulty = %settings.difficulty, operand_count = settings.operand_count))]
pub fn generate_problem(rng: &mut impl RandomSource, settings: &Settings) -> Result<Problem, TrainerError> {
  settings.validate()?;

  let operands: Vec<f64> = (0..settings.operand_count)
    .map(|_| generate_number(rng, settings.difficulty))
    .collect();
  let operators = (1..settings.operand_count)
    .map(|_| {
      generate_operator(rng, &settings.operators)
        .ok_or_else(|| TrainerError::invalid("at least one operator must be allowed"))
    })
    .collect::<Result<Vec<_>, _>>()?;

  let problem = build_problem(settings.difficulty, operands, operators)?;
  debug!(target: "problem", id = %problem.id, display = %problem.display_text, answer = problem.answer, "Generated problem");
  Ok(problem)
}

/// Generate `set_size` independent problems from the same settings.
#[instrument(level = "debug", skip(rng, settings))]
pub fn generate_practice_set(rng: &mut impl RandomSource, settings: &Settings, set_size: usize) -> Result<Vec<Problem>, TrainerError> {
  check_set_size(set_size)?;
  (0..set_size).map(|_| generate_problem(rng, settings)).collect()
}

pub fn check_set_size(set_size: usize) -> Result<(), TrainerError> {
  if set_size > MAX_SET_SIZE {
    return Err(TrainerError::invalid(format!("set size {set_size} exceeds {MAX_SET_SIZE}")));
  }
  Ok(())
}
