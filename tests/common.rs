//! Test utilities & fixtures.

use std::path::Path;

use riddlerooms::riddle::{Difficulty, Question, QuestionBank};
use riddlerooms::storage::CsvSessionStore;

/// CSV store rooted in `dir`, using the default file names.
pub fn store_in(dir: &Path) -> CsvSessionStore {
    CsvSessionStore::new(dir.join("player_sessions.csv"), dir.join("leaderboard.csv"))
}

/// Bank with one riddle per room so every draw is predictable.
#[allow(dead_code)] // not every test binary needs it
pub fn single_riddle_bank() -> QuestionBank {
    let mut bank = QuestionBank::new();
    bank.insert(Difficulty::Easy, Question::new("What is 2 + 2?", ["four", "4"]));
    bank.insert(Difficulty::Intermediate, Question::new("Opposite of up?", ["down"]));
    bank.insert(Difficulty::Hard, Question::new("Capital of France?", ["paris"]));
    bank
}
