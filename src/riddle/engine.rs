//! Session state machine: `Setup -> InProgress -> {Victory, Defeat, Abandoned}`.
//!
//! Construction is the setup step: it binds the chosen room, counts the session in
//! the store, and draws the first riddle. After that the caller drives the session
//! one answer at a time; every call yields exactly one [`TurnOutcome`]. All player
//! state is owned here and only changes inside turn resolution.
//!
//! Rules per resolved answer:
//! - correct: `score += points_per_win`
//! - wrong: `score -= points_per_loss`, `health -= health_loss` (never below zero)
//! - then `level += 1`; health 0 is a defeat, otherwise passing `max_levels` is a victory
//!
//! Each terminal transition writes the final score to the leaderboard exactly once.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::riddle::bank::{Difficulty, Question, QuestionBank};
use crate::riddle::selector::QuestionSelector;
use crate::riddle::validator::is_correct;
use crate::riddle::RiddleError;
use crate::storage::SessionStore;
use crate::validation::normalize_player_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    InProgress,
    Victory,
    Defeat,
    Abandoned,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GamePhase::InProgress)
    }
}

/// The three ways a session can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Victory,
    Defeat,
    Abandoned,
}

impl Ending {
    fn phase(self) -> GamePhase {
        match self {
            Ending::Victory => GamePhase::Victory,
            Ending::Defeat => GamePhase::Defeat,
            Ending::Abandoned => GamePhase::Abandoned,
        }
    }

    fn kind(self) -> OutcomeKind {
        match self {
            Ending::Victory => OutcomeKind::Victory,
            Ending::Defeat => OutcomeKind::Defeat,
            Ending::Abandoned => OutcomeKind::Abandoned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Setup finished; the first riddle is ready.
    Welcome,
    Correct,
    Wrong,
    Victory,
    Defeat,
    Abandoned,
}

impl OutcomeKind {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OutcomeKind::Victory | OutcomeKind::Defeat | OutcomeKind::Abandoned
        )
    }
}

/// Five repeating palette tiers, picked by `level % 5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTier {
    Green,
    LightGray,
    Cyan,
    Pink,
    Orange,
}

impl LevelTier {
    pub fn for_level(level: u32) -> Self {
        match level % 5 {
            1 => LevelTier::LightGray,
            2 => LevelTier::Cyan,
            3 => LevelTier::Pink,
            4 => LevelTier::Orange,
            _ => LevelTier::Green,
        }
    }

    /// Palette index (`level % 5`).
    pub fn index(self) -> u32 {
        match self {
            LevelTier::Green => 0,
            LevelTier::LightGray => 1,
            LevelTier::Cyan => 2,
            LevelTier::Pink => 3,
            LevelTier::Orange => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LevelTier::Green => "green",
            LevelTier::LightGray => "light gray",
            LevelTier::Cyan => "cyan",
            LevelTier::Pink => "pink",
            LevelTier::Orange => "orange",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub name: String,
    pub health: u32,
    pub score: i32,
    pub level: u32,
}

/// Renderable result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub kind: OutcomeKind,
    /// Verdict on the answer resolved by this transition, if any. Also set on the
    /// answer that ends the session in victory or defeat.
    pub answered: Option<bool>,
    pub message: String,
    pub health: u32,
    pub score: i32,
    pub level: u32,
    pub tier: LevelTier,
    /// A failed save, for the shell to show as a warning. Play is unaffected.
    pub persist_warning: Option<String>,
}

impl TurnOutcome {
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    pub fn level_color_index(&self) -> u32 {
        self.tier.index()
    }
}

const MSG_CORRECT: &str = "Correct! Well done, brave adventurer.";
const MSG_WRONG: &str = "Wrong answer. Your health is decreasing...";
const MSG_DEFEAT: &str = "Game Over! You have lost all your health.";

pub struct GameEngine<S: SessionStore, R: Rng = StdRng> {
    rules: GameConfig,
    difficulty: Difficulty,
    bank: Vec<Question>,
    selector: QuestionSelector,
    current: Option<Question>,
    player: PlayerState,
    phase: GamePhase,
    store: S,
    rng: R,
}

impl<S: SessionStore> GameEngine<S, StdRng> {
    /// Start a session with an entropy-seeded random source.
    pub fn start(
        bank: &QuestionBank,
        rules: GameConfig,
        store: S,
        player_name: &str,
        difficulty: Option<Difficulty>,
    ) -> Result<(Self, TurnOutcome), RiddleError> {
        Self::start_with_rng(bank, rules, store, player_name, difficulty, StdRng::from_entropy())
    }
}

impl<S: SessionStore, R: Rng> GameEngine<S, R> {
    /// Setup: resolve name and room, count the session, draw the first riddle.
    ///
    /// Fails with [`RiddleError::EmptyBank`] when the chosen room has no riddles.
    /// A failed session-count save does not stop the game; it is reported in the
    /// returned outcome's `persist_warning`.
    pub fn start_with_rng(
        bank: &QuestionBank,
        rules: GameConfig,
        mut store: S,
        player_name: &str,
        difficulty: Option<Difficulty>,
        rng: R,
    ) -> Result<(Self, TurnOutcome), RiddleError> {
        let name = normalize_player_name(player_name, &rules.default_player_name);
        let difficulty = difficulty.unwrap_or(rules.default_difficulty);
        let tier = bank.tier(difficulty);
        if tier.is_empty() {
            return Err(RiddleError::EmptyBank(difficulty));
        }

        let persist_warning = match store.record_session(&name) {
            Ok(count) => {
                log::info!("Session {} started for {:?} in the {} room", count, name, difficulty);
                None
            }
            Err(e) => {
                log::warn!("Unable to record session for {:?}: {}", name, e);
                Some(format!("Could not save your session count: {}", e))
            }
        };

        let player = PlayerState {
            name,
            health: rules.initial_health,
            score: 0,
            level: 1,
        };
        let mut engine = GameEngine {
            rules,
            difficulty,
            bank: tier.to_vec(),
            selector: QuestionSelector::new(),
            current: None,
            player,
            phase: GamePhase::InProgress,
            store,
            rng,
        };
        engine.draw_next();

        let message = format!(
            "Ahoy, traveler {}! Welcome to the {} room, brave adventurer.",
            engine.player.name, difficulty
        );
        let mut outcome = engine.outcome(OutcomeKind::Welcome, None, message);
        outcome.persist_warning = persist_warning;
        Ok((engine, outcome))
    }

    /// Resolve the current riddle with `answer`.
    pub fn submit_answer(&mut self, answer: &str) -> Result<TurnOutcome, RiddleError> {
        if self.phase.is_terminal() {
            return Err(RiddleError::SessionOver);
        }
        let question = match self.current.take() {
            Some(q) => q,
            None => {
                self.draw_next();
                self.current.take().ok_or(RiddleError::EmptyBank(self.difficulty))?
            }
        };

        let correct = is_correct(&question, answer);
        if correct {
            self.player.score = self.player.score.saturating_add(self.rules.points_per_win);
        } else {
            self.player.score = self.player.score.saturating_sub(self.rules.points_per_loss);
            self.player.health = self.player.health.saturating_sub(self.rules.health_loss);
        }
        self.player.level = self.player.level.saturating_add(1);
        log::debug!(
            "{:?} answered {:?} to {:?}: {} (health {}, score {}, level {})",
            self.player.name,
            answer,
            question.text(),
            if correct { "correct" } else { "wrong" },
            self.player.health,
            self.player.score,
            self.player.level
        );

        let verdict = if correct { MSG_CORRECT } else { MSG_WRONG };
        if self.player.health == 0 {
            let message = format!("{} {}", verdict, MSG_DEFEAT);
            return Ok(self.finish(Ending::Defeat, Some(correct), message));
        }
        if self.player.level > self.rules.max_levels {
            let message = format!(
                "{} Victory! You have conquered the {} room.",
                verdict, self.difficulty
            );
            return Ok(self.finish(Ending::Victory, Some(correct), message));
        }

        self.draw_next();
        let kind = if correct {
            OutcomeKind::Correct
        } else {
            OutcomeKind::Wrong
        };
        Ok(self.outcome(kind, Some(correct), verdict.to_string()))
    }

    /// The player gave no answer: end the session where it stands.
    pub fn abandon(&mut self) -> Result<TurnOutcome, RiddleError> {
        if self.phase.is_terminal() {
            return Err(RiddleError::SessionOver);
        }
        let message = format!("You slip out of the {} room.", self.difficulty);
        Ok(self.finish(Ending::Abandoned, None, message))
    }

    /// Riddle awaiting an answer; `None` once the session is over.
    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn rules(&self) -> &GameConfig {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn draw_next(&mut self) {
        let question = self.selector.select(&self.bank, &mut self.rng).clone();
        self.current = Some(question);
    }

    fn finish(&mut self, ending: Ending, answered: Option<bool>, message: String) -> TurnOutcome {
        let phase = ending.phase();
        self.phase = phase;
        self.current = None;
        let kind = ending.kind();
        log::info!(
            "{:?} finished the {} room: {:?} with score {}",
            self.player.name,
            self.difficulty,
            phase,
            self.player.score
        );
        let persist_warning = match self
            .store
            .record_leaderboard_score(&self.player.name, i64::from(self.player.score))
        {
            Ok(total) => {
                log::debug!("{:?} leaderboard total is now {}", self.player.name, total);
                None
            }
            Err(e) => {
                log::warn!("Unable to save leaderboard score for {:?}: {}", self.player.name, e);
                Some(format!("Could not save your score: {}", e))
            }
        };
        let message = format!("{} Final score: {}.", message, self.player.score);
        let mut outcome = self.outcome(kind, answered, message);
        outcome.persist_warning = persist_warning;
        outcome
    }

    fn outcome(&self, kind: OutcomeKind, answered: Option<bool>, message: String) -> TurnOutcome {
        TurnOutcome {
            kind,
            answered,
            message,
            health: self.player.health,
            score: self.player.score,
            level: self.player.level,
            tier: LevelTier::for_level(self.player.level),
            persist_warning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStore;

    fn start(difficulty: Difficulty) -> (GameEngine<MemorySessionStore>, TurnOutcome) {
        GameEngine::start_with_rng(
            &QuestionBank::builtin(),
            GameConfig::default(),
            MemorySessionStore::new(),
            "Ann",
            Some(difficulty),
            StdRng::seed_from_u64(42),
        )
        .unwrap()
    }

    fn right_answer(engine: &GameEngine<MemorySessionStore>) -> String {
        engine.current_question().unwrap().accepted_answers()[0].clone()
    }

    #[test]
    fn setup_counts_session_and_draws_first_riddle() {
        let (engine, welcome) = start(Difficulty::Easy);
        assert_eq!(welcome.kind, OutcomeKind::Welcome);
        assert_eq!((welcome.health, welcome.score, welcome.level), (50, 0, 1));
        assert_eq!(welcome.tier, LevelTier::LightGray);
        assert!(welcome.message.contains("Ann"));
        assert_eq!(engine.store().sessions.get("Ann"), Some(1));
        assert_eq!(engine.store().leaderboard_writes, 0);
        assert!(engine.current_question().is_some());
    }

    #[test]
    fn blank_name_and_missing_room_use_defaults() {
        let (engine, _) = GameEngine::start_with_rng(
            &QuestionBank::builtin(),
            GameConfig::default(),
            MemorySessionStore::new(),
            "   ",
            None,
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert_eq!(engine.player().name, "Adventurer");
        assert_eq!(engine.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn empty_room_cannot_start() {
        let result = GameEngine::start_with_rng(
            &QuestionBank::new(),
            GameConfig::default(),
            MemorySessionStore::new(),
            "Ann",
            Some(Difficulty::Hard),
            StdRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(RiddleError::EmptyBank(Difficulty::Hard))));
    }

    #[test]
    fn one_wrong_answer_costs_health_and_score() {
        let (mut engine, _) = start(Difficulty::Hard);
        let out = engine.submit_answer("definitely not").unwrap();
        assert_eq!(out.kind, OutcomeKind::Wrong);
        assert_eq!(out.answered, Some(false));
        assert_eq!((out.health, out.score, out.level), (40, -10, 2));
        assert_eq!(out.level_color_index(), 2);
    }

    #[test]
    fn five_wrong_answers_end_in_defeat() {
        let (mut engine, _) = start(Difficulty::Intermediate);
        for _ in 0..4 {
            let out = engine.submit_answer("nope").unwrap();
            assert_eq!(out.kind, OutcomeKind::Wrong);
        }
        assert_eq!((engine.player().health, engine.player().score), (10, -40));
        let out = engine.submit_answer("nope").unwrap();
        assert_eq!(out.kind, OutcomeKind::Defeat);
        assert_eq!(out.answered, Some(false));
        assert_eq!((out.health, out.score, out.level), (0, -50, 6));
        assert!(out.message.contains("Game Over"));
        assert_eq!(engine.phase(), GamePhase::Defeat);
        assert_eq!(engine.store().leaderboard.get("Ann"), Some(-50));
        assert_eq!(engine.store().leaderboard_writes, 1);
    }

    #[test]
    fn five_correct_answers_end_in_victory() {
        let (mut engine, _) = start(Difficulty::Easy);
        for turn in 1..=5 {
            let answer = right_answer(&engine);
            let out = engine.submit_answer(&format!("  {}  ", answer.to_uppercase())).unwrap();
            if turn < 5 {
                assert_eq!(out.kind, OutcomeKind::Correct);
                assert_eq!(out.level, turn + 1);
            } else {
                assert_eq!(out.kind, OutcomeKind::Victory);
                assert_eq!(out.answered, Some(true));
                assert_eq!((out.health, out.score, out.level), (50, 100, 6));
                assert!(out.message.contains("Final score: 100"));
            }
        }
        assert!(engine.current_question().is_none());
        assert_eq!(engine.store().leaderboard.get("Ann"), Some(100));
        assert_eq!(engine.store().leaderboard_writes, 1);
    }

    #[test]
    fn health_is_clamped_at_zero_on_the_last_wrong_answer() {
        let rules = GameConfig {
            initial_health: 45,
            ..GameConfig::default()
        };
        let (mut engine, welcome) = GameEngine::start_with_rng(
            &QuestionBank::builtin(),
            rules,
            MemorySessionStore::new(),
            "Ann",
            Some(Difficulty::Easy),
            StdRng::seed_from_u64(3),
        )
        .unwrap();
        assert_eq!(welcome.health, 45);
        let mut seen = Vec::new();
        loop {
            let out = engine.submit_answer("nope").unwrap();
            assert!(out.health <= 45);
            seen.push(out.health);
            if out.is_terminal() {
                assert_eq!(out.kind, OutcomeKind::Defeat);
                break;
            }
            assert_eq!(out.kind, OutcomeKind::Wrong);
        }
        assert_eq!(seen, vec![35, 25, 15, 5, 0]);
        assert_eq!(engine.player().health, 0);
        assert_eq!(engine.store().leaderboard_writes, 1);
    }

    #[test]
    fn abandon_keeps_accrued_state_and_writes_once() {
        let (mut engine, _) = start(Difficulty::Easy);
        let answer = right_answer(&engine);
        engine.submit_answer(&answer).unwrap();
        engine.submit_answer("wrong").unwrap();
        let out = engine.abandon().unwrap();
        assert_eq!(out.kind, OutcomeKind::Abandoned);
        assert_eq!(out.answered, None);
        assert_eq!((out.health, out.score, out.level), (40, 10, 3));
        assert_eq!(engine.store().leaderboard_writes, 1);
        assert_eq!(engine.store().leaderboard.get("Ann"), Some(10));
    }

    #[test]
    fn terminal_states_reject_further_turns() {
        let (mut engine, _) = start(Difficulty::Easy);
        engine.abandon().unwrap();
        assert!(matches!(engine.submit_answer("keyboard"), Err(RiddleError::SessionOver)));
        assert!(matches!(engine.abandon(), Err(RiddleError::SessionOver)));
        assert_eq!(engine.store().leaderboard_writes, 1);
    }

    #[test]
    fn riddles_do_not_repeat_within_a_cycle() {
        let mut bank = QuestionBank::new();
        for i in 0..5 {
            bank.insert(Difficulty::Easy, Question::new(format!("riddle {}", i), ["x"]));
        }
        let (mut engine, _) = GameEngine::start_with_rng(
            &bank,
            GameConfig::default(),
            MemorySessionStore::new(),
            "Ann",
            Some(Difficulty::Easy),
            StdRng::seed_from_u64(7),
        )
        .unwrap();
        let mut seen = std::collections::HashSet::new();
        while let Some(q) = engine.current_question() {
            assert!(seen.insert(q.text().to_string()), "repeated {}", q.text());
            engine.submit_answer("x").unwrap();
        }
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn level_tiers_cycle_every_five_levels() {
        assert_eq!(LevelTier::for_level(1), LevelTier::LightGray);
        assert_eq!(LevelTier::for_level(5), LevelTier::Green);
        assert_eq!(LevelTier::for_level(6), LevelTier::LightGray);
        assert_eq!(LevelTier::for_level(9).index(), 4);
    }
}
