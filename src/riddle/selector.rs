//! Non-repeating riddle draws.
//!
//! A selector remembers which riddles of the active room were already asked in the
//! current cycle. Once every riddle has been asked the cycle resets and any riddle
//! may come up again.

use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::riddle::bank::Question;

#[derive(Debug, Clone, Default)]
pub struct QuestionSelector {
    used: HashSet<String>,
}

impl QuestionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a riddle uniformly among those not yet asked in this cycle.
    ///
    /// Panics if `bank` is empty; sessions refuse to start on an empty room.
    pub fn select<'a, R: Rng>(&mut self, bank: &'a [Question], rng: &mut R) -> &'a Question {
        assert!(!bank.is_empty(), "cannot draw a riddle from an empty bank");
        if self.used.len() >= bank.len() {
            self.used.clear();
        }
        let fresh = bank
            .iter()
            .filter(|q| !self.used.contains(q.text()))
            .choose(rng);
        let question = match fresh {
            Some(q) => q,
            None => {
                // Stale ids from another bank can leave nothing fresh; start over.
                self.used.clear();
                &bank[rng.gen_range(0..bank.len())]
            }
        };
        self.used.insert(question.text().to_string());
        question
    }

    /// Number of riddles asked in the current cycle.
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    pub fn was_used(&self, text: &str) -> bool {
        self.used.contains(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bank(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question::new(format!("riddle {}", i), [format!("answer {}", i)]))
            .collect()
    }

    #[test]
    fn full_cycle_has_no_repeats() {
        let bank = bank(7);
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut selector = QuestionSelector::new();
            let mut seen = HashSet::new();
            for _ in 0..bank.len() {
                let q = selector.select(&bank, &mut rng);
                assert!(seen.insert(q.text().to_string()), "repeat within cycle (seed {})", seed);
            }
            assert_eq!(seen.len(), bank.len());
            assert_eq!(selector.used_count(), bank.len());
        }
    }

    #[test]
    fn cycle_resets_after_exhaustion() {
        let bank = bank(3);
        let mut rng = StdRng::seed_from_u64(11);
        let mut selector = QuestionSelector::new();
        for _ in 0..3 {
            selector.select(&bank, &mut rng);
        }
        let next = selector.select(&bank, &mut rng).text().to_string();
        assert_eq!(selector.used_count(), 1);
        assert!(selector.was_used(&next));
    }

    #[test]
    fn single_riddle_bank_repeats_every_turn() {
        let bank = bank(1);
        let mut rng = StdRng::seed_from_u64(3);
        let mut selector = QuestionSelector::new();
        for _ in 0..4 {
            assert_eq!(selector.select(&bank, &mut rng).text(), "riddle 0");
        }
    }

    #[test]
    #[should_panic(expected = "empty bank")]
    fn empty_bank_fails_fast() {
        let mut rng = StdRng::seed_from_u64(0);
        QuestionSelector::new().select(&[], &mut rng);
    }
}
