//! Line-oriented front end: reads commands, dispatches them to the session, and
//! writes one reply per command (human text or a JSON line).

use std::io::{BufRead, Write};

use tracing::{debug, error, info, instrument, warn};

use crate::config::OutputMode;
use crate::domain::Settings;
use crate::protocol::{
    answer_out, parse_text_command, settings_out, to_out, verdict_out, ClientMessage, ProblemOut, ServerMessage,
    HELP_TEXT,
};
use crate::sampler::RandomSource;
use crate::session::Session;

/// Dispatch one message. Returns the reply and whether the loop should stop.
#[instrument(level = "debug", skip(session))]
pub fn handle_message<R: RandomSource>(
    session: &mut Session<R>,
    msg: ClientMessage,
    default_set_size: usize,
) -> (ServerMessage, bool) {
    let reply = match msg {
        ClientMessage::Ping => Ok(ServerMessage::Pong),
        ClientMessage::NewProblem => session
            .next_problem()
            .map(|p| ServerMessage::Problem { problem: to_out(p) }),
        ClientMessage::SubmitAnswer { answer, problem_id } => session
            .submit_answer(&answer, problem_id.as_deref())
            .map(|v| verdict_out(&v)),
        ClientMessage::ShowAnswer => Ok(answer_out(session.reveal_answer())),
        ClientMessage::PracticeSet { size } => session
            .practice_set(size.unwrap_or(default_set_size))
            .map(|set| ServerMessage::PracticeSet { problems: set.iter().map(to_out).collect() }),
        ClientMessage::UpdateSettings { difficulty, operand_count, operators } => {
            let updated = match (difficulty, operand_count, operators) {
                (Some(d), None, None) => session.set_difficulty(d),
                (None, Some(n), None) => session.set_operand_count(n),
                (None, None, Some(ops)) => session.set_operators(ops),
                (difficulty, operand_count, operators) => {
                    let current = session.settings().clone();
                    Settings::new(
                        difficulty.unwrap_or(current.difficulty),
                        operand_count.unwrap_or(current.operand_count),
                        operators.unwrap_or(current.operators),
                    )
                    .and_then(|s| session.apply_settings(s))
                }
            };
            updated.map(|p| ServerMessage::Problem { problem: to_out(p) })
        }
        ClientMessage::ToggleOperator { operator } => session
            .toggle_operator(operator)
            .map(|p| ServerMessage::Problem { problem: to_out(p) }),
        ClientMessage::Settings => Ok(settings_out(session.settings())),
        ClientMessage::Stats => Ok(ServerMessage::Stats { stats: session.stats() }),
        ClientMessage::Help => Ok(ServerMessage::Help { text: HELP_TEXT.to_string() }),
        ClientMessage::Quit => return (ServerMessage::Bye { stats: session.stats() }, true),
    };

    match reply {
        Ok(m) => (m, false),
        Err(e) => {
            if e.is_answer_error() {
                debug!(target: "session", error = %e, "Rejected input");
            } else {
                warn!(target: "session", error = %e, "Command failed");
            }
            (ServerMessage::Error { message: e.to_string() }, false)
        }
    }
}

fn render_problem(p: &ProblemOut) -> String {
    let ops: Vec<&str> = p.operators.iter().map(|o| o.symbol()).collect();
    format!(
        "[{} · {}] {}  ({} numbers · {})",
        p.difficulty.label(),
        p.operation,
        p.display,
        p.operand_count,
        ops.join(", ")
    )
}

/// Human readable rendering of a reply.
pub fn render_text(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::Pong => "pong".to_string(),
        ServerMessage::Problem { problem } => render_problem(problem),
        ServerMessage::AnswerResult { correct, feedback, score, streak, .. } => {
            let mark = if *correct { "✔" } else { "✘" };
            format!("{mark} {feedback}  (score {score}, streak {streak})")
        }
        ServerMessage::Answer { answer, .. } => format!("Answer: {answer}"),
        ServerMessage::PracticeSet { problems } => problems
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{:>2}. {}", i + 1, render_problem(p)))
            .collect::<Vec<_>>()
            .join("\n"),
        ServerMessage::Settings { settings, preview, difficulty_description } => {
            let ops: Vec<&str> = settings.operators.iter().map(|o| o.symbol()).collect();
            format!(
                "Difficulty: {} ({})\nNumbers: {}\nOperators: {}\n{}",
                settings.difficulty.label(),
                difficulty_description,
                settings.operand_count,
                ops.join(" "),
                preview
            )
        }
        ServerMessage::Stats { stats } => format!(
            "Score: {}  Streak: {}  Best streak: {}  Attempted: {}",
            stats.score, stats.streak, stats.best_streak, stats.attempted
        ),
        ServerMessage::Help { text } => text.clone(),
        ServerMessage::Error { message } => format!("error: {message}"),
        ServerMessage::Bye { stats } => format!("Bye! Final score {} (best streak {}).", stats.score, stats.best_streak),
    }
}

fn write_reply<W: Write>(out: &mut W, mode: OutputMode, msg: &ServerMessage) -> std::io::Result<()> {
    match mode {
        OutputMode::Text => writeln!(out, "{}", render_text(msg))?,
        OutputMode::Json => {
            let line = serde_json::to_string(msg).unwrap_or_else(|e| {
                serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
            });
            writeln!(out, "{line}")?;
        }
    }
    out.flush()
}

fn parse_line(line: &str, mode: OutputMode) -> Result<ClientMessage, String> {
    match mode {
        OutputMode::Json => serde_json::from_str(line).map_err(|e| format!("Invalid JSON: {}", e)),
        OutputMode::Text => parse_text_command(line).map_err(|e| e.to_string()),
    }
}

/// Run the read/dispatch/reply loop until `quit` or end of input.
#[instrument(level = "info", skip_all, fields(?mode))]
pub fn run<R, I, W>(session: &mut Session<R>, input: I, out: &mut W, mode: OutputMode, set_size: usize) -> std::io::Result<()>
where
    R: RandomSource,
    I: BufRead,
    W: Write,
{
    info!(target: "mathmizer", "Console started");
    if mode == OutputMode::Text {
        writeln!(out, "Mathmizer · type 'help' for commands")?;
        writeln!(out, "{}", render_text(&settings_out(session.settings())))?;
    }
    write_reply(out, mode, &ServerMessage::Problem { problem: to_out(session.current()) })?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (reply, quit) = match parse_line(&line, mode) {
            Ok(msg) => handle_message(session, msg, set_size),
            Err(message) => (ServerMessage::Error { message }, false),
        };
        if let Err(e) = write_reply(out, mode, &reply) {
            error!(target: "mathmizer", error = %e, "Write failed");
            return Err(e);
        }
        if quit {
            info!(target: "mathmizer", "Console closed by user");
            return Ok(());
        }
    }
    write_reply(out, mode, &ServerMessage::Bye { stats: session.stats() })?;
    info!(target: "mathmizer", "Console input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, Operator};
    use crate::generator::build_problem;
    use crate::sampler::ScriptedSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session<StdRng> {
        Session::new(Settings::default(), StdRng::seed_from_u64(5)).unwrap()
    }

    fn run_text(session: &mut Session<StdRng>, input: &str) -> String {
        let mut out = Vec::new();
        run(session, input.as_bytes(), &mut out, OutputMode::Text, 10).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_session_flow() {
        let mut s = session();
        let answer = s.current().answer().to_string();
        let script = format!("{answer}\nn\n\nstats\nq\nignored\n");
        let out = run_text(&mut s, &script);
        assert!(out.contains("✔ Excellent!  (score 1, streak 1)"), "{out}");
        assert!(out.contains("Score: 1  Streak: 1  Best streak: 1  Attempted: 1"), "{out}");
        assert!(out.contains("Bye! Final score 1"), "{out}");
        assert_eq!(s.stats().attempted, 1);
    }

    #[test]
    fn errors_are_reported_and_loop_continues() {
        let mut s = session();
        let out = run_text(&mut s, "count 12\nops\ntwelve\nsettings\n");
        assert!(out.contains("error: invalid configuration: operand count 12 is outside 2..=10"), "{out}");
        assert!(out.contains("error: invalid configuration: at least one operator must be allowed"), "{out}");
        assert!(out.contains("error: 'twelve' is not a number"), "{out}");
        assert!(out.contains("Numbers: 2"), "{out}");
        assert!(out.contains("Bye!"), "{out}");
    }

    #[test]
    fn json_session_flow() {
        let mut s = session();
        let id = s.current().id().to_string();
        let input = format!(
            "{{\"type\":\"submit_answer\",\"answer\":\"-99999\",\"problemId\":\"{id}\"}}\n\
             {{\"type\":\"update_settings\",\"difficulty\":\"medium\",\"operandCount\":3,\"operators\":[\"+\"]}}\n\
             {{\"type\":\"practice_set\",\"size\":2}}\n\
             not json\n\
             {{\"type\":\"quit\"}}\n"
        );
        let mut out = Vec::new();
        run(&mut s, input.as_bytes(), &mut out, OutputMode::Json, 10).unwrap();
        let lines: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines[0]["type"], "problem");
        assert_eq!(lines[1]["type"], "answer_result");
        assert_eq!(lines[1]["correct"], false);
        assert_eq!(lines[1]["streak"], 0);
        assert_eq!(lines[2]["type"], "problem");
        assert_eq!(lines[2]["problem"]["operation"], "Addition");
        assert_eq!(lines[2]["problem"]["operandCount"], 3);
        assert_eq!(lines[3]["problems"].as_array().unwrap().len(), 2);
        assert_eq!(lines[4]["type"], "error");
        assert!(lines[4]["message"].as_str().unwrap().starts_with("Invalid JSON"));
        assert_eq!(lines[5]["type"], "bye");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn show_then_submit_is_rejected() {
        let rng = ScriptedSource::new([
            ScriptedSource::medium(100),
            ScriptedSource::medium(4),
            0.0,
        ]);
        let mut s = Session::new(Settings::new(Difficulty::Medium, 2, [Operator::Div]).unwrap(), rng).unwrap();
        let (reply, _) = handle_message(&mut s, ClientMessage::ShowAnswer, 10);
        assert_eq!(render_text(&reply), "Answer: 25");
        let (reply, quit) = handle_message(&mut s, ClientMessage::SubmitAnswer { answer: "25".into(), problem_id: None }, 10);
        assert!(!quit);
        assert!(matches!(reply, ServerMessage::Error { .. }));
        assert_eq!(s.stats().score, 0);
    }

    #[test]
    fn toggling_last_operator_reports_error() {
        let mut s = Session::new(Settings::new(Difficulty::Easy, 2, [Operator::Add]).unwrap(), StdRng::seed_from_u64(1)).unwrap();
        let (reply, _) = handle_message(&mut s, ClientMessage::ToggleOperator { operator: Operator::Add }, 10);
        assert_eq!(render_text(&reply), "error: invalid configuration: Addition is the last remaining operator");
    }

    #[test]
    fn single_field_commands_keep_other_settings() {
        let mut s = Session::new(Settings::new(Difficulty::Easy, 2, [Operator::Mul]).unwrap(), StdRng::seed_from_u64(2)).unwrap();
        let first = s.current().id();

        let (reply, _) = handle_message(&mut s, parse_text_command("difficulty hard").unwrap(), 10);
        assert!(matches!(reply, ServerMessage::Problem { .. }));
        assert_eq!(s.settings().difficulty, Difficulty::Hard);
        assert_eq!(s.settings().operand_count, 2);
        assert_ne!(s.current().id(), first);

        let (reply, _) = handle_message(&mut s, parse_text_command("count 4").unwrap(), 10);
        assert!(matches!(reply, ServerMessage::Problem { .. }));
        assert_eq!(s.settings().difficulty, Difficulty::Hard);
        assert_eq!(s.settings().operand_count, 4);
        assert_eq!(s.settings().operators, vec![Operator::Mul]);
        assert_eq!(s.current().operands().len(), 4);
    }

    #[test]
    fn oversized_practice_set_is_an_error_line() {
        let mut s = session();
        let out = run_text(&mut s, "set 4000000000
set 2
");
        assert!(out.contains("error: invalid configuration: set size 4000000000 exceeds 100"), "{out}");
        assert!(out.contains(" 2. [Easy · "), "{out}");
        assert!(!out.contains(" 3. ["), "{out}");
        assert!(out.contains("Bye!"), "{out}");
    }

    #[test]
    fn problem_line_shows_count_and_operators() {
        let p = build_problem(Difficulty::Medium, vec![12.0, 30.0], vec![Operator::Add]).unwrap();
        let line = render_text(&ServerMessage::Problem { problem: to_out(&p) });
        assert_eq!(line, "[Medium · Addition] 12 + 30 = ?  (2 numbers · +)");

        let p = build_problem(Difficulty::Easy, vec![200.0, 50.0, 4.0], vec![Operator::Percent, Operator::Div]).unwrap();
        let line = render_text(&ServerMessage::Problem { problem: to_out(&p) });
        assert_eq!(line, "[Easy · Mixed Operations] 200 × 50% / 4 = ?  (3 numbers · %, /)");
    }
}
