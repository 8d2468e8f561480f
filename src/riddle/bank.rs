//! Riddle banks: one collection of questions per difficulty room.
//!
//! A bank is populated once at startup, either from the built-in riddles or from a
//! JSON file shaped like:
//!
//! ```json
//! {
//!   "easy": [ { "question": "What has keys but cannot open locks?", "answers": ["keyboard", "a keyboard"] } ],
//!   "intermediate": [],
//!   "hard": []
//! }
//! ```
//!
//! Banks are immutable once handed to a session.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::riddle::RiddleError;

/// Difficulty room the player picks at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Intermediate,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Intermediate, Difficulty::Hard];

    /// Room label shown in menus.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = RiddleError;

    /// Accepts the room name in any case, or its menu number (1-3).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "easy" | "e" | "1" => Ok(Difficulty::Easy),
            "intermediate" | "i" | "2" => Ok(Difficulty::Intermediate),
            "hard" | "h" | "3" => Ok(Difficulty::Hard),
            _ => Err(RiddleError::UnknownDifficulty(trimmed.to_string())),
        }
    }
}

/// A riddle and the phrasings accepted as correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    answers: Vec<String>,
}

impl Question {
    /// Build a question; accepted answers are trimmed and blank ones dropped.
    pub fn new(text: impl Into<String>, answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let answers = answers
            .into_iter()
            .map(|a| {
                let a: String = a.into();
                a.trim().to_string()
            })
            .filter(|a| !a.is_empty())
            .collect();
        Question {
            text: text.into(),
            answers,
        }
    }

    /// Question text; also the identifier used for no-repeat tracking.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn accepted_answers(&self) -> &[String] {
        &self.answers
    }
}

/// On-disk riddle entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RiddleSeed {
    question: String,
    answers: Vec<String>,
}

/// All riddles, grouped by room.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    tiers: HashMap<Difficulty, Vec<Question>>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// The riddles shipped with the game, two per room.
    pub fn builtin() -> Self {
        let mut bank = QuestionBank::new();
        bank.insert(
            Difficulty::Easy,
            Question::new("What has keys but cannot open locks?", ["keyboard", "a keyboard"]),
        );
        bank.insert(
            Difficulty::Easy,
            Question::new("What is so fragile that saying its name breaks it?", ["silence", "quiet"]),
        );
        bank.insert(
            Difficulty::Intermediate,
            Question::new(
                "I speak without a mouth and hear without ears. What am I?",
                ["echo", "an echo"],
            ),
        );
        bank.insert(
            Difficulty::Intermediate,
            Question::new(
                "The more you take, the more you leave behind. What am I?",
                ["footsteps", "steps"],
            ),
        );
        bank.insert(
            Difficulty::Hard,
            Question::new(
                "What can travel around the world while staying in the corner?",
                ["stamp", "a stamp"],
            ),
        );
        bank.insert(
            Difficulty::Hard,
            Question::new(
                "What runs but never walks, has a bed but never sleeps?",
                ["river", "a river"],
            ),
        );
        bank
    }

    /// Add a riddle to a room. A riddle with the same text replaces the earlier one.
    pub fn insert(&mut self, difficulty: Difficulty, question: Question) {
        let tier = self.tiers.entry(difficulty).or_default();
        match tier.iter_mut().find(|q| q.text == question.text) {
            Some(existing) => *existing = question,
            None => tier.push(question),
        }
    }

    /// Riddles for one room; empty if the room has none.
    pub fn tier(&self, difficulty: Difficulty) -> &[Question] {
        self.tiers.get(&difficulty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a bank from JSON text.
    pub fn from_json_str(contents: &str) -> Result<Self, RiddleError> {
        let seeds: BTreeMap<Difficulty, Vec<RiddleSeed>> = serde_json::from_str(contents)?;
        let mut bank = QuestionBank::new();
        for (difficulty, riddles) in seeds {
            for seed in riddles {
                let question = Question::new(seed.question, seed.answers);
                if question.answers.is_empty() {
                    return Err(RiddleError::NoAnswers {
                        question: question.text,
                    });
                }
                bank.insert(difficulty, question);
            }
        }
        Ok(bank)
    }

    /// Load a bank from a JSON file.
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, RiddleError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let bank = Self::from_json_str(&contents)?;
        log::info!("Loaded {} riddles from {}", bank.len(), path.display());
        Ok(bank)
    }

    /// Serialize the bank in the same JSON shape `from_json_str` reads.
    pub fn to_json_pretty(&self) -> Result<String, RiddleError> {
        let seeds: BTreeMap<Difficulty, Vec<RiddleSeed>> = Difficulty::ALL
            .iter()
            .map(|&d| {
                let riddles = self
                    .tier(d)
                    .iter()
                    .map(|q| RiddleSeed {
                        question: q.text.clone(),
                        answers: q.answers.clone(),
                    })
                    .collect();
                (d, riddles)
            })
            .collect();
        Ok(serde_json::to_string_pretty(&seeds)?)
    }
}
