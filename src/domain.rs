//! Domain models: difficulty levels, operators, practice settings and the problem itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TrainerError;

pub const MIN_OPERANDS: usize = 2;
pub const MAX_OPERANDS: usize = 10;

/// How hard the operands are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  /// Rounded magnitudes only: 3, 40, 500, 7000.
  #[default]
  Easy,
  /// Whole numbers 1..=999.
  Medium,
  /// Reals in [1, 1000) with two decimals.
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Difficulty::Easy => "Rounded numbers only (100, 200, 2000, etc.)",
      Difficulty::Medium => "Any whole numbers",
      Difficulty::Hard => "Including decimal numbers",
    }
  }

  fn preview_note(self) -> &'static str {
    match self {
      Difficulty::Easy => "Numbers will be rounded (e.g., 100, 500, 2000).",
      Difficulty::Medium => "Numbers will be whole integers.",
      Difficulty::Hard => "Numbers may include decimals.",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Difficulty {
  type Err = TrainerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "easy" | "e" => Ok(Difficulty::Easy),
      "medium" | "m" => Ok(Difficulty::Medium),
      "hard" | "h" => Ok(Difficulty::Hard),
      other => Err(TrainerError::invalid(format!(
        "unknown difficulty '{other}' (expected one of {})",
        Difficulty::ALL.map(Difficulty::as_str).join(", ")
      ))),
    }
  }
}

/// Arithmetic operator applied pairwise during the left-to-right fold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
  #[serde(alias = "+")]
  Add,
  #[serde(alias = "-")]
  Sub,
  #[serde(alias = "*")]
  Mul,
  #[serde(alias = "/")]
  Div,
  #[serde(alias = "%")]
  Percent,
}

impl Operator {
  pub const ALL: [Operator; 5] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div, Operator::Percent];

  pub fn symbol(self) -> &'static str {
    match self {
      Operator::Add => "+",
      Operator::Sub => "-",
      Operator::Mul => "*",
      Operator::Div => "/",
      Operator::Percent => "%",
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Operator::Add => "Addition",
      Operator::Sub => "Subtraction",
      Operator::Mul => "Multiplication",
      Operator::Div => "Division",
      Operator::Percent => "Percentage",
    }
  }
}

impl fmt::Display for Operator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

impl FromStr for Operator {
  type Err = TrainerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "+" | "add" | "addition" | "plus" => Ok(Operator::Add),
      "-" | "sub" | "subtraction" | "minus" => Ok(Operator::Sub),
      "*" | "x" | "×" | "mul" | "multiplication" | "times" => Ok(Operator::Mul),
      "/" | "÷" | "div" | "division" => Ok(Operator::Div),
      "%" | "percent" | "percentage" => Ok(Operator::Percent),
      other => Err(TrainerError::invalid(format!("unknown operator '{other}'"))),
    }
  }
}

/// Parse a list like `"+, -, *"` or `"add sub"` into operators.
pub fn parse_operator_list(s: &str) -> Result<Vec<Operator>, TrainerError> {
  s.split(|c: char| c == ',' || c.is_whitespace())
    .filter(|t| !t.is_empty())
    .map(str::parse)
    .collect()
}

/// Configuration for one generation call. Validated on construction and again
/// on every generation, since fields are public for the settings panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
  pub difficulty: Difficulty,
  pub operand_count: usize,
  pub operators: Vec<Operator>,
}

impl Default for Settings {
  fn default() -> Self {
    Self::with_all_operators(Difficulty::Easy, MIN_OPERANDS)
  }
}

impl Settings {
  /// Build validated settings. Duplicate operators collapse; order is canonical.
  pub fn new(difficulty: Difficulty, operand_count: usize, operators: impl IntoIterator<Item = Operator>) -> Result<Self, TrainerError> {
    let mut operators: Vec<Operator> = operators.into_iter().collect();
    operators.sort();
    operators.dedup();
    let s = Self { difficulty, operand_count, operators };
    s.validate()?;
    Ok(s)
  }

  /// Convenience constructor permitting every operator.
  pub fn with_all_operators(difficulty: Difficulty, operand_count: usize) -> Self {
    Self { difficulty, operand_count, operators: Operator::ALL.to_vec() }
  }

  pub fn validate(&self) -> Result<(), TrainerError> {
    if !(MIN_OPERANDS..=MAX_OPERANDS).contains(&self.operand_count) {
      return Err(TrainerError::invalid(format!(
        "operand count {} is outside {}..={}",
        self.operand_count, MIN_OPERANDS, MAX_OPERANDS
      )));
    }
    if self.operators.is_empty() {
      return Err(TrainerError::invalid("at least one operator must be allowed"));
    }
    Ok(())
  }

  /// Sentence shown under the settings panel.
  pub fn preview(&self) -> String {
    format!(
      "You'll solve {} problems with {} numbers. {}",
      self.difficulty, self.operand_count, self.difficulty.preview_note()
    )
  }
}

/// One generated exercise. Built once by the generator, never mutated after.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
  pub(crate) id: Uuid,
  pub(crate) difficulty: Difficulty,
  pub(crate) operands: Vec<f64>,
  pub(crate) operators: Vec<Operator>,
  pub(crate) display_text: String,
  pub(crate) answer: f64,
  pub(crate) operation_summary: String,
}

impl Problem {
  pub fn id(&self) -> Uuid { self.id }
  pub fn difficulty(&self) -> Difficulty { self.difficulty }
  pub fn operands(&self) -> &[f64] { &self.operands }
  pub fn operators(&self) -> &[Operator] { &self.operators }
  pub fn display_text(&self) -> &str { &self.display_text }
  pub fn answer(&self) -> f64 { self.answer }
  pub fn operation_summary(&self) -> &str { &self.operation_summary }

  /// Answer rendered the same way operands are.
  pub fn answer_text(&self) -> String {
    crate::util::format_number(self.answer, self.difficulty)
  }
}
