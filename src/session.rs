//! Practice session state: settings, the current problem, score and streak.
//!
//! This module owns:
//!   - the active settings (changed through the settings-panel operations)
//!   - the random source, confined to the session
//!   - the current problem and whether it was answered or revealed
//!   - score / streak counters
//!
//! Any settings change regenerates the current problem.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::domain::{Difficulty, Operator, Problem, Settings};
use crate::error::TrainerError;
use crate::generator::{generate_practice_set, generate_problem};
use crate::sampler::RandomSource;
use crate::util::{is_correct, parse_answer};

/// Outcome of a judged submission.
#[derive(Clone, Debug)]
pub struct Verdict {
    pub correct: bool,
    pub expected_text: String,
    pub feedback: String,
    pub score: u32,
    pub streak: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub attempted: u32,
}

pub struct Session<R> {
    settings: Settings,
    rng: R,
    current: Problem,
    // Answered or revealed; locks further submissions.
    locked: bool,
    stats: Stats,
}

impl<R: RandomSource> Session<R> {
    /// Validate settings and generate the first problem.
    #[instrument(level = "info", skip(rng))]
    pub fn new(settings: Settings, mut rng: R) -> Result<Self, TrainerError> {
        let current = generate_problem(&mut rng, &settings)?;
        info!(target: "session", preview = %settings.preview(), "Session started");
        Ok(Self { settings, rng, current, locked: false, stats: Stats::default() })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current(&self) -> &Problem {
        &self.current
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Discard the current problem and generate a fresh one.
    #[instrument(level = "debug", skip(self))]
    pub fn next_problem(&mut self) -> Result<&Problem, TrainerError> {
        self.current = generate_problem(&mut self.rng, &self.settings)?;
        self.locked = false;
        info!(target: "session", id = %self.current.id(), summary = %self.current.operation_summary(), "New problem");
        Ok(&self.current)
    }

    /// Judge a raw answer against the current problem.
    ///
    /// Input errors (empty, non-numeric, stale id) leave score and streak alone.
    #[instrument(level = "info", skip(self, raw), fields(raw_len = raw.len()))]
    pub fn submit_answer(&mut self, raw: &str, problem_id: Option<&str>) -> Result<Verdict, TrainerError> {
        if let Some(id) = problem_id {
            let expected = self.current.id().to_string();
            if id != expected {
                warn!(target: "session", %expected, got = %id, "Answer for a stale problem");
                return Err(TrainerError::StaleProblem { expected, got: id.to_string() });
            }
        }
        if self.locked {
            return Err(TrainerError::AlreadyAnswered);
        }
        let submitted = parse_answer(raw)?;

        let expected = self.current.answer();
        let expected_text = self.current.answer_text();
        let correct = is_correct(submitted, expected);
        self.stats.attempted += 1;
        let feedback = if correct {
            self.stats.score += 1;
            self.stats.streak += 1;
            self.stats.best_streak = self.stats.best_streak.max(self.stats.streak);
            "Excellent!".to_string()
        } else {
            self.stats.streak = 0;
            format!("Not quite. The answer is {expected_text}")
        };
        self.locked = true;

        info!(target: "session", id = %self.current.id(), %correct, score = self.stats.score, streak = self.stats.streak, "Answer judged");
        Ok(Verdict {
            correct,
            expected_text,
            feedback,
            score: self.stats.score,
            streak: self.stats.streak,
        })
    }

    /// Show the answer without scoring. Submissions are locked afterwards.
    pub fn reveal_answer(&mut self) -> &Problem {
        self.locked = true;
        info!(target: "session", id = %self.current.id(), "Answer revealed");
        &self.current
    }

    /// Independent problems from the current settings; the current problem is untouched.
    pub fn practice_set(&mut self, size: usize) -> Result<Vec<Problem>, TrainerError> {
        generate_practice_set(&mut self.rng, &self.settings, size)
    }

    /// Replace all settings at once. Invalid settings are rejected and the old ones kept.
    #[instrument(level = "info", skip(self))]
    pub fn apply_settings(&mut self, settings: Settings) -> Result<&Problem, TrainerError> {
        settings.validate()?;
        let problem = generate_problem(&mut self.rng, &settings)?;
        self.settings = settings;
        self.current = problem;
        self.locked = false;
        info!(target: "session", preview = %self.settings.preview(), "Settings applied");
        Ok(&self.current)
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<&Problem, TrainerError> {
        let next = Settings { difficulty, ..self.settings.clone() };
        self.apply_settings(next)
    }

    pub fn set_operand_count(&mut self, operand_count: usize) -> Result<&Problem, TrainerError> {
        let next = Settings { operand_count, ..self.settings.clone() };
        self.apply_settings(next)
    }

    pub fn set_operators(&mut self, operators: Vec<Operator>) -> Result<&Problem, TrainerError> {
        let next = Settings::new(self.settings.difficulty, self.settings.operand_count, operators)?;
        self.apply_settings(next)
    }

    /// Select or deselect one operator. The last remaining operator cannot be deselected.
    pub fn toggle_operator(&mut self, op: Operator) -> Result<&Problem, TrainerError> {
        let mut ops = self.settings.operators.clone();
        if let Some(pos) = ops.iter().position(|o| *o == op) {
            if ops.len() == 1 {
                return Err(TrainerError::invalid(format!("{} is the last remaining operator", op.name())));
            }
            ops.remove(pos);
        } else {
            ops.push(op);
        }
        self.set_operators(ops)
    }
}
