use thiserror::Error;

use crate::model::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionStateError {
    #[error("selected choice must be present exactly when the question is answered")]
    SelectionMismatch,
}

/// Mutable per-question progress: answer, reveal, and review-mark status.
///
/// Answers are final. `answered`, `explanation_revealed`, and
/// `selected_choice` are set together by the first `record_answer` and never
/// change afterwards; only the review mark stays freely togglable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionState {
    answered: bool,
    explanation_revealed: bool,
    selected_choice: Option<usize>,
    marked_for_review: bool,
}

impl QuestionState {
    /// Rehydrate a state from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStateError::SelectionMismatch` if `selected_choice`
    /// presence does not match the answered flag.
    pub fn from_persisted(
        answered: bool,
        explanation_revealed: bool,
        selected_choice: Option<usize>,
        marked_for_review: bool,
    ) -> Result<Self, QuestionStateError> {
        if answered != selected_choice.is_some() {
            return Err(QuestionStateError::SelectionMismatch);
        }

        Ok(Self {
            answered,
            explanation_revealed,
            selected_choice,
            marked_for_review,
        })
    }

    #[must_use]
    pub fn answered(&self) -> bool {
        self.answered
    }

    #[must_use]
    pub fn explanation_revealed(&self) -> bool {
        self.explanation_revealed
    }

    #[must_use]
    pub fn selected_choice(&self) -> Option<usize> {
        self.selected_choice
    }

    #[must_use]
    pub fn marked_for_review(&self) -> bool {
        self.marked_for_review
    }

    /// Record an answer. The first answer wins; repeat calls are no-ops.
    ///
    /// Returns `true` when the answer was recorded, `false` when the question
    /// had already been answered.
    pub fn record_answer(&mut self, choice: usize) -> bool {
        if self.answered {
            return false;
        }
        self.answered = true;
        self.explanation_revealed = true;
        self.selected_choice = Some(choice);
        true
    }

    /// Flip the review mark and return its new value.
    pub fn toggle_review_mark(&mut self) -> bool {
        self.marked_for_review = !self.marked_for_review;
        self.marked_for_review
    }

    /// Whether the recorded answer matches the question's correct choice.
    ///
    /// Returns `None` while unanswered.
    #[must_use]
    pub fn is_correct(&self, question: &Question) -> Option<bool> {
        self.selected_choice.map(|choice| question.is_correct(choice))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
