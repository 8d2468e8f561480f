//! Line-oriented front end for a riddle session.
//!
//! Reads answers from any [`BufRead`] and writes prompts and outcomes to any
//! [`Write`], so the same loop drives a terminal and the tests. End of input or
//! the `/quit` command is the "no answer" signal and abandons the session; every
//! other line, empty ones included, is submitted as an answer.

use std::io::{self, BufRead, Write};

use rand::Rng;

use crate::riddle::{Difficulty, GameEngine, OutcomeKind, RiddleError, TurnOutcome};
use crate::storage::{SessionStore, Tally};

pub const QUIT_COMMAND: &str = "/quit";

/// One `★` per 10 health points.
pub fn health_bar(health: u32) -> String {
    vec!["★"; (health / 10) as usize].join(" ")
}

/// Status line shown under every outcome.
pub fn status_line(outcome: &TurnOutcome) -> String {
    let bar = health_bar(outcome.health);
    format!(
        "Health {} [{}]  Score {}  Level {} ({})",
        outcome.health,
        bar,
        outcome.score,
        outcome.level,
        outcome.tier.name()
    )
}

/// Full rendering of an outcome: message, optional warning, status line.
pub fn render_outcome(outcome: &TurnOutcome) -> String {
    let mut out = String::new();
    out.push_str(&outcome.message);
    out.push('\n');
    if let Some(warning) = &outcome.persist_warning {
        out.push_str("Warning: ");
        out.push_str(warning);
        out.push('\n');
    }
    out.push_str(&status_line(outcome));
    out.push('\n');
    out
}

/// "Leaderboard:" block, highest value first.
pub fn render_leaderboard(title: &str, tally: &Tally) -> String {
    let mut out = format!("{}:\n\n", title);
    if tally.is_empty() {
        out.push_str("No scores yet. Be the first to play!\n");
        return out;
    }
    for (rank, (name, value)) in tally.ranked().into_iter().enumerate() {
        out.push_str(&format!("{:>2}. {}: {}\n", rank + 1, name, value));
    }
    out
}

/// Print `prompt` and read one line without its line ending. `None` at end of input.
pub fn prompt_line<I: BufRead, O: Write>(
    input: &mut I,
    output: &mut O,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Ask for a room until a valid choice is made. Blank input or end of input means
/// "no choice" and yields `None`.
pub fn choose_difficulty<I: BufRead, O: Write>(
    input: &mut I,
    output: &mut O,
) -> io::Result<Option<Difficulty>> {
    writeln!(output, "Select a room:")?;
    for (idx, d) in Difficulty::ALL.iter().enumerate() {
        writeln!(output, "{:>2}) {}", idx + 1, d)?;
    }
    loop {
        let line = match prompt_line(input, output, "Room: ")? {
            Some(line) => line,
            None => return Ok(None),
        };
        if line.trim().is_empty() {
            return Ok(None);
        }
        match line.parse::<Difficulty>() {
            Ok(d) => return Ok(Some(d)),
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
}

/// Drive an already started session to its end and return the final outcome.
pub fn play_session<S, R, I, O>(
    engine: &mut GameEngine<S, R>,
    welcome: &TurnOutcome,
    input: &mut I,
    output: &mut O,
) -> Result<TurnOutcome, ShellError>
where
    S: SessionStore,
    R: Rng,
    I: BufRead,
    O: Write,
{
    write!(output, "{}", render_outcome(welcome))?;
    writeln!(output, "(type {} to leave the room)", QUIT_COMMAND)?;
    loop {
        let riddle = match engine.current_question() {
            Some(q) => q.text().to_string(),
            None => return Err(ShellError::Riddle(RiddleError::SessionOver)),
        };
        writeln!(output)?;
        writeln!(output, "Riddle {}: {}", engine.player().level, riddle)?;
        let outcome = match prompt_line(input, output, "> ")? {
            Some(line) if line.trim() == QUIT_COMMAND => engine.abandon()?,
            Some(line) => engine.submit_answer(&line)?,
            None => {
                writeln!(output)?;
                engine.abandon()?
            }
        };
        write!(output, "{}", render_outcome(&outcome))?;
        if outcome.is_terminal() {
            if outcome.kind == OutcomeKind::Victory {
                writeln!(output, "You escaped the {} room!", engine.difficulty())?;
            }
            return Ok(outcome);
        }
    }
}

/// Failures of the interactive loop.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("terminal io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Riddle(#[from] RiddleError),
}
