//! Console protocol: messages exchanged with the front end (serde ready).
//!
//! In JSON mode every input line is a `ClientMessage` and every reply a
//! `ServerMessage`. In text mode input lines are parsed by `parse_text_command`
//! into the same `ClientMessage`, so both modes share one dispatcher.

use serde::{Deserialize, Serialize};

use crate::domain::{parse_operator_list, Difficulty, Operator, Problem, Settings};
use crate::error::TrainerError;
use crate::session::{Stats, Verdict};
use crate::util::format_number;

/// Messages the front end can send.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    NewProblem,
    SubmitAnswer {
        answer: String,
        #[serde(default, rename = "problemId")]
        problem_id: Option<String>,
    },
    ShowAnswer,
    PracticeSet {
        #[serde(default)]
        size: Option<usize>,
    },
    UpdateSettings {
        #[serde(default)]
        difficulty: Option<Difficulty>,
        #[serde(default, rename = "operandCount")]
        operand_count: Option<usize>,
        #[serde(default)]
        operators: Option<Vec<Operator>>,
    },
    ToggleOperator {
        operator: Operator,
    },
    Settings,
    Stats,
    Help,
    Quit,
}

/// Messages sent back to the front end.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Pong,
    Problem {
        problem: ProblemOut,
    },
    AnswerResult {
        correct: bool,
        expected: String,
        feedback: String,
        score: u32,
        streak: u32,
    },
    Answer {
        #[serde(rename = "problemId")]
        problem_id: String,
        answer: String,
    },
    PracticeSet {
        problems: Vec<ProblemOut>,
    },
    Settings {
        settings: Settings,
        preview: String,
        #[serde(rename = "difficultyDescription")]
        difficulty_description: String,
    },
    Stats {
        stats: Stats,
    },
    Help {
        text: String,
    },
    Error {
        message: String,
    },
    Bye {
        stats: Stats,
    },
}

/// DTO for problem delivery. The answer is withheld until revealed or judged.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOut {
    pub id: String,
    pub difficulty: Difficulty,
    pub display: String,
    pub operation: String,
    pub operand_count: usize,
    pub operators: Vec<Operator>,
}

pub fn to_out(p: &Problem) -> ProblemOut {
    ProblemOut {
        id: p.id().to_string(),
        difficulty: p.difficulty(),
        display: p.display_text().to_string(),
        operation: p.operation_summary().to_string(),
        operand_count: p.operands().len(),
        operators: p.operators().to_vec(),
    }
}

pub fn verdict_out(v: &Verdict) -> ServerMessage {
    ServerMessage::AnswerResult {
        correct: v.correct,
        expected: v.expected_text.clone(),
        feedback: v.feedback.clone(),
        score: v.score,
        streak: v.streak,
    }
}

pub fn answer_out(p: &Problem) -> ServerMessage {
    ServerMessage::Answer {
        problem_id: p.id().to_string(),
        answer: format_number(p.answer(), p.difficulty()),
    }
}

pub fn settings_out(s: &Settings) -> ServerMessage {
    ServerMessage::Settings {
        settings: s.clone(),
        preview: s.preview(),
        difficulty_description: s.difficulty.description().to_string(),
    }
}

pub const HELP_TEXT: &str = "\
<number>          submit an answer
n, next           new problem
s, show           reveal the answer
set [N]           print a practice set of N problems
difficulty <d>    easy | medium | hard
count <n>         numbers per problem (2-10)
ops <op...>       allowed operators, e.g. ops + - * / %
toggle <op>       select or deselect one operator
settings          show current settings
stats             score and streak
q, quit           leave";

/// Parse one line of human input.
pub fn parse_text_command(line: &str) -> Result<ClientMessage, TrainerError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let msg = match head.to_ascii_lowercase().as_str() {
        "" => return Err(TrainerError::EmptyAnswer),
        "n" | "next" | "new" => ClientMessage::NewProblem,
        "s" | "show" => ClientMessage::ShowAnswer,
        "set" | "practice" => ClientMessage::PracticeSet {
            size: if rest.is_empty() {
                None
            } else {
                Some(rest.parse().map_err(|_| TrainerError::invalid(format!("'{rest}' is not a set size")))?)
            },
        },
        "difficulty" | "level" => ClientMessage::UpdateSettings {
            difficulty: Some(rest.parse()?),
            operand_count: None,
            operators: None,
        },
        "count" | "numbers" => ClientMessage::UpdateSettings {
            difficulty: None,
            operand_count: Some(
                rest.parse()
                    .map_err(|_| TrainerError::invalid(format!("'{rest}' is not an operand count")))?,
            ),
            operators: None,
        },
        "ops" | "operators" => ClientMessage::UpdateSettings {
            difficulty: None,
            operand_count: None,
            operators: Some(parse_operator_list(rest)?),
        },
        "toggle" => ClientMessage::ToggleOperator { operator: rest.parse()? },
        "settings" => ClientMessage::Settings,
        "stats" | "score" => ClientMessage::Stats,
        "help" | "?" => ClientMessage::Help,
        "q" | "quit" | "exit" => ClientMessage::Quit,
        "ping" => ClientMessage::Ping,
        _ => ClientMessage::SubmitAnswer { answer: line.to_string(), problem_id: None },
    };
    Ok(msg)
}
