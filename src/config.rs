//! Loading practice configuration from TOML plus environment overrides.
//!
//! Schema (all keys optional):
//! ```toml
//! [practice]
//! difficulty = "medium"
//! operand_count = 3
//! operators = ["add", "sub", "%"]
//! set_size = 10
//! seed = 42
//! output = "json"
//! ```
//!
//! Env overrides: MATHMIZER_DIFFICULTY, MATHMIZER_OPERANDS, MATHMIZER_OPERATORS,
//! MATHMIZER_SET_SIZE, MATHMIZER_SEED, MATHMIZER_OUTPUT.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{parse_operator_list, Difficulty, Operator, Settings, MIN_OPERANDS};
use crate::error::TrainerError;
use crate::generator::{check_set_size, DEFAULT_SET_SIZE};

pub const CONFIG_PATH_ENV: &str = "MATHMIZER_CONFIG_PATH";

#[derive(Clone, Copy, Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
  /// Human readable prompts.
  #[default]
  Text,
  /// One JSON message per line, for machine front ends.
  Json,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TrainerConfig {
  #[serde(default)]
  pub practice: PracticeCfg,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PracticeCfg {
  #[serde(default)]
  pub difficulty: Difficulty,
  #[serde(default = "default_operand_count")]
  pub operand_count: usize,
  #[serde(default = "default_operators")]
  pub operators: Vec<Operator>,
  #[serde(default = "default_set_size")]
  pub set_size: usize,
  #[serde(default)]
  pub seed: Option<u64>,
  #[serde(default)]
  pub output: OutputMode,
}

fn default_operand_count() -> usize { MIN_OPERANDS }
fn default_operators() -> Vec<Operator> { Operator::ALL.to_vec() }
fn default_set_size() -> usize { DEFAULT_SET_SIZE }

impl Default for PracticeCfg {
  fn default() -> Self {
    Self {
      difficulty: Difficulty::default(),
      operand_count: default_operand_count(),
      operators: default_operators(),
      set_size: default_set_size(),
      seed: None,
      output: OutputMode::default(),
    }
  }
}

impl PracticeCfg {
  /// Validated generation settings.
  pub fn settings(&self) -> Result<Settings, TrainerError> {
    Settings::new(self.difficulty, self.operand_count, self.operators.iter().copied())
  }

  /// Apply overrides read through `lookup` (normally `std::env::var`).
  pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), TrainerError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(v) = lookup("MATHMIZER_DIFFICULTY") {
      self.difficulty = v.parse()?;
    }
    if let Some(v) = lookup("MATHMIZER_OPERANDS") {
      self.operand_count = parse_number("MATHMIZER_OPERANDS", &v)?;
    }
    if let Some(v) = lookup("MATHMIZER_OPERATORS") {
      self.operators = parse_operator_list(&v)?;
    }
    if let Some(v) = lookup("MATHMIZER_SET_SIZE") {
      self.set_size = parse_number("MATHMIZER_SET_SIZE", &v)?;
    }
    if let Some(v) = lookup("MATHMIZER_SEED") {
      self.seed = Some(parse_number("MATHMIZER_SEED", &v)?);
    }
    if let Some(v) = lookup("MATHMIZER_OUTPUT") {
      self.output = match v.trim().to_ascii_lowercase().as_str() {
        "json" => OutputMode::Json,
        "text" | "pretty" => OutputMode::Text,
        other => return Err(TrainerError::invalid(format!("MATHMIZER_OUTPUT: unknown mode '{other}'"))),
      };
    }
    Ok(())
  }
}

fn parse_number<T: std::str::FromStr>(key: &str, v: &str) -> Result<T, TrainerError> {
  v.trim()
    .parse()
    .map_err(|_| TrainerError::invalid(format!("{key}: '{v}' is not a valid number")))
}

/// Read and parse a TOML config file.
pub fn load_config_file(path: &Path) -> Result<TrainerConfig, TrainerError> {
  let s = std::fs::read_to_string(path).map_err(|source| TrainerError::ConfigRead { path: path.to_path_buf(), source })?;
  let cfg = toml::from_str::<TrainerConfig>(&s).map_err(|source| TrainerError::ConfigParse { path: path.to_path_buf(), source })?;
  info!(target: "mathmizer", path = %path.display(), "Loaded trainer config (TOML)");
  Ok(cfg)
}

/// Build the practice config from MATHMIZER_CONFIG_PATH (if set) and env overrides.
/// A missing env path means defaults; a broken file or bad override is an error.
pub fn load_practice_config_from_env() -> Result<PracticeCfg, TrainerError> {
  let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
    Ok(path) => load_config_file(Path::new(&path))?.practice,
    Err(_) => {
      info!(target: "mathmizer", "{} not set; using defaults", CONFIG_PATH_ENV);
      PracticeCfg::default()
    }
  };
  cfg.apply_overrides(|k| std::env::var(k).ok())?;
  check_set_size(cfg.set_size)?;
  if cfg.set_size == 0 {
    warn!(target: "mathmizer", "set_size is 0; practice sets will be empty");
  }
  Ok(cfg)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::io::Write;

  fn write_config(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(body.as_bytes()).unwrap();
    f
  }

  #[test]
  fn full_file_parses() {
    let f = write_config(
      r#"
[practice]
difficulty = "hard"
operand_count = 4
operators = ["add", "%", "/"]
set_size = 5
seed = 42
output = "json"
"#,
    );
    let cfg = load_config_file(f.path()).unwrap().practice;
    assert_eq!(cfg.difficulty, Difficulty::Hard);
    assert_eq!(cfg.operand_count, 4);
    assert_eq!(cfg.set_size, 5);
    assert_eq!(cfg.seed, Some(42));
    assert_eq!(cfg.output, OutputMode::Json);
    let s = cfg.settings().unwrap();
    assert_eq!(s.operators, vec![Operator::Add, Operator::Div, Operator::Percent]);
  }

  #[test]
  fn empty_file_uses_defaults() {
    let f = write_config("");
    let cfg = load_config_file(f.path()).unwrap().practice;
    assert_eq!(cfg.difficulty, Difficulty::Easy);
    assert_eq!(cfg.operand_count, 2);
    assert_eq!(cfg.operators, Operator::ALL.to_vec());
    assert_eq!(cfg.set_size, 10);
    assert_eq!(cfg.output, OutputMode::Text);
  }

  #[test]
  fn empty_operator_list_is_invalid() {
    let f = write_config("[practice]\noperators = []\n");
    let cfg = load_config_file(f.path()).unwrap().practice;
    assert!(matches!(cfg.settings(), Err(TrainerError::InvalidConfiguration(_))));
  }

  #[test]
  fn malformed_file_reports_parse_error() {
    let f = write_config("[practice]\ndifficulty = \"insane\"\n");
    assert!(matches!(load_config_file(f.path()), Err(TrainerError::ConfigParse { .. })));
  }

  #[test]
  fn missing_file_reports_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_file(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, TrainerError::ConfigRead { .. }));
  }

  #[test]
  fn overrides_replace_file_values() {
    let env: HashMap<&str, &str> = HashMap::from([
      ("MATHMIZER_DIFFICULTY", "medium"),
      ("MATHMIZER_OPERANDS", "7"),
      ("MATHMIZER_OPERATORS", "+,*"),
      ("MATHMIZER_SEED", "9"),
      ("MATHMIZER_OUTPUT", "json"),
    ]);
    let mut cfg = PracticeCfg::default();
    cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
    assert_eq!(cfg.difficulty, Difficulty::Medium);
    assert_eq!(cfg.operand_count, 7);
    assert_eq!(cfg.operators, vec![Operator::Add, Operator::Mul]);
    assert_eq!(cfg.seed, Some(9));
    assert_eq!(cfg.output, OutputMode::Json);
  }

  #[test]
  fn oversized_set_size_override_is_rejected() {
    let mut cfg = PracticeCfg::default();
    cfg.apply_overrides(|k| (k == "MATHMIZER_SET_SIZE").then(|| "5000".to_string())).unwrap();
    assert!(matches!(check_set_size(cfg.set_size), Err(TrainerError::InvalidConfiguration(_))));
  }

  #[test]
  fn bad_override_is_invalid_configuration() {
    let mut cfg = PracticeCfg::default();
    let err = cfg
      .apply_overrides(|k| (k == "MATHMIZER_OPERANDS").then(|| "lots".to_string()))
      .unwrap_err();
    assert!(matches!(err, TrainerError::InvalidConfiguration(_)));
  }
}
