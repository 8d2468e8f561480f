//! # Riddle Rooms - a text riddle adventure
//!
//! A player picks a difficulty room, answers a run of riddles, and gains or loses
//! score and health with every answer. Session counts and cumulative scores are kept
//! in two small CSV tables that double as the leaderboard.
//!
//! ## Features
//!
//! - **Three Rooms**: Easy, Intermediate and Hard riddle banks, built in or loaded from JSON.
//! - **No Repeats**: riddles are drawn at random without repetition until a room is exhausted.
//! - **Forgiving Answers**: trimmed, case-insensitive match against a few accepted phrasings.
//! - **Clear Endings**: a session ends in victory (level cap passed), defeat (health gone) or
//!   by leaving the room; each ending saves the score exactly once.
//! - **Flat Files**: `Name,Sessions` and `Name,Score` tables, rewritten whole on every save.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use riddlerooms::config::GameConfig;
//! use riddlerooms::riddle::{Difficulty, GameEngine, QuestionBank};
//! use riddlerooms::storage::CsvSessionStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = CsvSessionStore::new("data/player_sessions.csv", "data/leaderboard.csv");
//!     let bank = QuestionBank::builtin();
//!     let (mut engine, welcome) =
//!         GameEngine::start(&bank, GameConfig::default(), store, "Ann", Some(Difficulty::Easy))?;
//!     println!("{}", welcome.message);
//!     let outcome = engine.submit_answer("keyboard")?;
//!     println!("{} (health {}, score {})", outcome.message, outcome.health, outcome.score);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`riddle`] - Riddle banks, selection, answer checks and the session engine
//! - [`storage`] - Session and leaderboard tables
//! - [`shell`] - Line-oriented front end used by the binary
//! - [`config`] - Configuration management
//! - [`validation`] - Player name normalization
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Shell       │ ← prompts, rendering, leaderboard display
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   GameEngine    │ ← health / score / level, win and loss
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ SessionStore    │ ← CSV tables
//! └─────────────────┘
//! ```

pub mod config;
pub mod riddle;
pub mod shell;
pub mod storage;
pub mod validation;
