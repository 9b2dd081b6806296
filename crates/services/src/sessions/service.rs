use std::fmt;

use quiz_core::model::{Question, QuestionState, ScoreSummary};
use storage::repository::SessionStateRecord;

use super::progress::SessionProgress;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Which view the session is in.
///
/// `Results` is a presentation-terminal state, not a data-terminal one:
/// `review` re-enters `Active` with every `QuestionState` intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Results,
}

/// Outcome of a relative forward navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the given question index.
    Moved(usize),
    /// Already at the last question; the session transitioned to results.
    Completed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session over an ordered question bank.
///
/// Owns one `QuestionState` per question (index-aligned), the current
/// position, and the phase. All mutation goes through the command methods
/// here; scores are derived by scanning, never cached.
pub struct QuizSession {
    questions: Vec<Question>,
    states: Vec<QuestionState>,
    current: usize,
    phase: SessionPhase,
}

impl QuizSession {
    /// Create a fresh session with all-default question states.
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        let states = vec![QuestionState::default(); questions.len()];
        Self {
            questions,
            states,
            current: 0,
            phase: SessionPhase::Active,
        }
    }

    /// Create a session from a previously persisted record.
    ///
    /// A record that is absent, of the wrong length, or internally
    /// inconsistent falls back to all-default states. Restoring never fails.
    #[must_use]
    pub fn restore(questions: Vec<Question>, record: Option<SessionStateRecord>) -> Self {
        let n = questions.len();
        let states = record.and_then(|record| record.into_states(n));
        let states = match states {
            Some(states) => states,
            None => {
                tracing::debug!(questions = n, "no usable persisted session; starting fresh");
                vec![QuestionState::default(); n]
            }
        };

        Self {
            questions,
            states,
            current: 0,
            phase: SessionPhase::Active,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn states(&self) -> &[QuestionState] {
        &self.states
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Results
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn current_state(&self) -> Option<&QuestionState> {
        self.states.get(self.current)
    }

    /// Answer the current question with the given choice index.
    ///
    /// The first answer wins: re-answering an answered question is a no-op
    /// and returns `false`. Whether the choice is correct does not matter
    /// here; correctness is derived at scoring time.
    ///
    /// Callers are expected to pass a choice index that exists on the current
    /// question; the presentation layer only offers valid choices.
    pub fn answer(&mut self, choice: usize) -> bool {
        match self.states.get_mut(self.current) {
            Some(state) => state.record_answer(choice),
            None => false,
        }
    }

    /// Jump to any question. Navigation is unrestricted: answered or not,
    /// forward or backward, there is no sequential-completion gate.
    ///
    /// An out-of-range index is a caller contract violation and is ignored.
    pub fn navigate_to(&mut self, index: usize) {
        if index < self.questions.len() {
            self.current = index;
        }
    }

    /// Move to the next question, or complete the session when already at the
    /// last one (or the bank is empty).
    pub fn navigate_next(&mut self) -> Advance {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            Advance::Moved(self.current)
        } else {
            self.phase = SessionPhase::Results;
            Advance::Completed
        }
    }

    /// Move to the previous question; a no-op at index 0.
    pub fn navigate_previous(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    /// Flip the review mark on the current question and return its new value.
    ///
    /// Allowed at any time, answered or not.
    pub fn toggle_review_mark(&mut self) -> bool {
        match self.states.get_mut(self.current) {
            Some(state) => state.toggle_review_mark(),
            None => false,
        }
    }

    /// Leave the results view and re-enter answering mode at question 0,
    /// leaving every `QuestionState` untouched.
    pub fn review(&mut self) {
        self.phase = SessionPhase::Active;
        self.current = 0;
    }

    /// Reset every `QuestionState` to defaults and return to question 0.
    ///
    /// Store teardown is the workflow's job; this only resets memory.
    pub fn restart(&mut self) {
        self.states = vec![QuestionState::default(); self.questions.len()];
        self.current = 0;
        self.phase = SessionPhase::Active;
    }

    /// Derive the score by scanning states against questions.
    #[must_use]
    pub fn score(&self) -> ScoreSummary {
        ScoreSummary::tally(&self.questions, &self.states)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.states.iter().filter(|state| state.answered()).count()
    }

    /// Snapshot of aggregate progress for the header/progress bar.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let score = self.score();
        SessionProgress {
            answered: self.answered_count(),
            total: self.question_count(),
            correct: score.correct(),
            incorrect: score.incorrect(),
            is_complete: self.is_complete(),
        }
    }

    /// Persistable shape of the current states.
    #[must_use]
    pub fn state_record(&self) -> SessionStateRecord {
        SessionStateRecord::from_states(&self.states)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answered_count())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
