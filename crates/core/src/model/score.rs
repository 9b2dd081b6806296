use crate::model::{Question, QuestionState};

/// Derived score for a session: always recomputed from per-question truth,
/// never incremented independently, so a restored session can not drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    correct: u32,
    incorrect: u32,
    total: u32,
}

impl ScoreSummary {
    /// Scan states against their questions and tally the score.
    ///
    /// Unanswered questions contribute to neither count, so
    /// `correct + incorrect <= total` always holds.
    #[must_use]
    pub fn tally(questions: &[Question], states: &[QuestionState]) -> Self {
        debug_assert_eq!(questions.len(), states.len());

        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        for (question, state) in questions.iter().zip(states) {
            match state.is_correct(question) {
                Some(true) => correct = correct.saturating_add(1),
                Some(false) => incorrect = incorrect.saturating_add(1),
                None => {}
            }
        }

        Self {
            correct,
            incorrect,
            total: u32::try_from(questions.len()).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.correct + self.incorrect
    }

    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.total - self.answered()
    }

    /// Final score as a percentage of the whole bank, 0.0 for an empty bank.
    ///
    /// Unanswered questions count against the percentage; completing a quiz
    /// does not require answering everything.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total) * 100.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;

    fn question(correct: usize) -> Question {
        QuestionDraft {
            question: "Q?".to_owned(),
            choices: vec!["A".to_owned(), "B".to_owned(), "C".to_owned()],
            correct_answer: correct,
            explanation: "because".to_owned(),
            reference: None,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn tally_counts_each_answered_question_once() {
        let questions = vec![question(1), question(0), question(2)];
        let mut states = vec![QuestionState::default(); 3];
        states[0].record_answer(1); // correct
        states[1].record_answer(1); // incorrect

        let score = ScoreSummary::tally(&questions, &states);
        assert_eq!(score.correct(), 1);
        assert_eq!(score.incorrect(), 1);
        assert_eq!(score.answered(), 2);
        assert_eq!(score.unanswered(), 1);
        assert!(score.correct() + score.incorrect() <= score.total());
    }

    #[test]
    fn percentage_spans_the_whole_bank() {
        let questions = vec![question(1), question(0), question(2)];
        let mut states = vec![QuestionState::default(); 3];
        states[0].record_answer(1);

        let score = ScoreSummary::tally(&questions, &states);
        assert!((score.percentage() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_bank_scores_zero_percent() {
        let score = ScoreSummary::tally(&[], &[]);
        assert_eq!(score.total(), 0);
        assert!((score.percentage() - 0.0).abs() < f64::EPSILON);
    }
}
