use crate::riddle::bank::Question;

/// Judge a free-text answer: trimmed, case-insensitive match against any accepted phrasing.
pub fn is_correct(question: &Question, raw_answer: &str) -> bool {
    let answer = raw_answer.trim().to_lowercase();
    question
        .accepted_answers()
        .iter()
        .any(|accepted| accepted.to_lowercase() == answer)
}
