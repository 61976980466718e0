//! Error type shared by generation, the session layer and config loading.
//!
//! Degenerate arithmetic (division or percentage by zero) is not an error:
//! the evaluator falls back to a defined value instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainerError {
  /// Operand count out of range, empty operator set, malformed sequences, etc.
  #[error("invalid configuration: {0}")]
  InvalidConfiguration(String),

  #[error("answer is empty")]
  EmptyAnswer,

  #[error("'{0}' is not a number")]
  UnparsableAnswer(String),

  /// The current problem was already answered or its answer was revealed.
  #[error("this problem is already answered; ask for the next one")]
  AlreadyAnswered,

  #[error("answer refers to problem {got}, but the current problem is {expected}")]
  StaleProblem { expected: String, got: String },

  #[error("failed to read config file {}: {source}", .path.display())]
  ConfigRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {}: {source}", .path.display())]
  ConfigParse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

impl TrainerError {
  pub fn invalid(msg: impl Into<String>) -> Self {
    TrainerError::InvalidConfiguration(msg.into())
  }

  /// Answer-side errors leave the session untouched; the user can retry.
  pub fn is_answer_error(&self) -> bool {
    matches!(
      self,
      TrainerError::EmptyAnswer | TrainerError::UnparsableAnswer(_) | TrainerError::StaleProblem { .. }
    )
  }
}
