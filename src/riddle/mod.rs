//! Riddle game core: banks, draws, answer checks and the session engine.
//!
//! The engine knows nothing about terminals or files beyond the [`SessionStore`]
//! seam; the line-oriented front end lives in [`crate::shell`].
//!
//! [`SessionStore`]: crate::storage::SessionStore

pub mod bank;
pub mod engine;
pub mod errors;
pub mod selector;
pub mod validator;

pub use bank::{Difficulty, Question, QuestionBank};
pub use engine::{GameEngine, GamePhase, LevelTier, OutcomeKind, PlayerState, TurnOutcome};
pub use errors::RiddleError;
pub use selector::QuestionSelector;
pub use validator::is_correct;
