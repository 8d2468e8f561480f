//! Scripted terminal sessions through the shell loop.

mod common;

use std::io::Cursor;

use rand::rngs::StdRng;
use rand::SeedableRng;
use riddlerooms::config::GameConfig;
use riddlerooms::riddle::{Difficulty, GameEngine, OutcomeKind};
use riddlerooms::shell::{play_session, render_leaderboard};
use riddlerooms::storage::TallyFile;

#[test]
fn scripted_victory_prints_riddles_and_saves_score() {
    let tmp = tempfile::tempdir().unwrap();
    let bank = common::single_riddle_bank();
    let (mut engine, welcome) = GameEngine::start_with_rng(
        &bank,
        GameConfig::default(),
        common::store_in(tmp.path()),
        "  Dee  ",
        Some(Difficulty::Intermediate),
        StdRng::seed_from_u64(11),
    )
    .unwrap();
    assert!(welcome.message.starts_with("Ahoy, traveler Dee!"));

    let mut input = Cursor::new("down\nDOWN\nup\ndown\ndown\n");
    let mut output = Vec::new();
    let last = play_session(&mut engine, &welcome, &mut input, &mut output).unwrap();
    assert_eq!(last.kind, OutcomeKind::Victory);
    assert_eq!((last.health, last.score, last.level), (40, 70, 6));

    let shown = String::from_utf8(output).unwrap();
    for level in 1..=5 {
        assert!(shown.contains(&format!("Riddle {}: Opposite of up?", level)));
    }
    assert!(!shown.contains("Riddle 6:"));
    assert!(shown.contains("You escaped the Intermediate room!"));
    assert!(shown.contains("Final score: 70."));

    let board = TallyFile::leaderboard(tmp.path().join("leaderboard.csv")).load_lenient();
    assert!(board.rejected.is_empty());
    assert_eq!(
        render_leaderboard("Leaderboard", &board.tally),
        "Leaderboard:\n\n 1. Dee: 70\n"
    );
}

#[test]
fn blank_name_plays_as_default_adventurer() {
    let tmp = tempfile::tempdir().unwrap();
    let bank = common::single_riddle_bank();
    let (mut engine, welcome) = GameEngine::start_with_rng(
        &bank,
        GameConfig::default(),
        common::store_in(tmp.path()),
        "   ",
        None,
        StdRng::seed_from_u64(12),
    )
    .unwrap();
    assert_eq!(engine.difficulty(), Difficulty::Easy);
    let mut output = Vec::new();
    play_session(&mut engine, &welcome, &mut Cursor::new("/quit\n"), &mut output).unwrap();

    let sessions = TallyFile::sessions(tmp.path().join("player_sessions.csv"))
        .load()
        .unwrap();
    assert_eq!(sessions.get("Adventurer"), Some(1));
}
