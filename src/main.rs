//! Mathmizer · arithmetic practice trainer
//!
//! - Randomized left-to-right expressions at easy / medium / hard difficulty
//! - Answers judged within ±0.01, with score and streak tracking
//! - Text or JSON-lines console on stdin/stdout
//!
//! Important env variables:
//!   MATHMIZER_CONFIG_PATH : path to TOML config ([practice] table)
//!   MATHMIZER_DIFFICULTY  : easy | medium | hard
//!   MATHMIZER_OPERANDS    : numbers per problem, 2..=10
//!   MATHMIZER_OPERATORS   : e.g. "+,-,*" or "add sub"
//!   MATHMIZER_SET_SIZE    : default practice set size (10)
//!   MATHMIZER_SEED        : u64 seed for a reproducible session
//!   MATHMIZER_OUTPUT      : "text" (default) or "json"
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod config;
mod console;
mod domain;
mod error;
mod generator;
mod protocol;
mod sampler;
mod session;
mod telemetry;
mod util;

use std::io;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use crate::config::load_practice_config_from_env;
use crate::session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = load_practice_config_from_env().map_err(|e| {
    error!(target: "mathmizer", error = %e, "Invalid configuration");
    e
  })?;
  let settings = cfg.settings()?;

  // Seeded sessions replay the same problems.
  let rng = match cfg.seed {
    Some(seed) => {
      info!(target: "mathmizer", seed, "Using seeded random source");
      StdRng::seed_from_u64(seed)
    }
    None => StdRng::from_entropy(),
  };

  let mut session = Session::new(settings, rng)?;
  let stdin = io::stdin();
  let mut stdout = io::stdout();
  console::run(&mut session, stdin.lock(), &mut stdout, cfg.output, cfg.set_size)?;
  Ok(())
}
