//! Presentation-agnostic snapshots of session state.
//!
//! These are intentionally **not** UI view-models: no pre-formatted strings,
//! no styling decisions. The presentation layer renders them however it
//! likes; what they do encode is *what may be shown*, e.g. the explanation
//! and correct choice stay absent until the question is answered.

use quiz_core::model::{Question, QuestionState};

use super::service::QuizSession;

/// Reference link, flattened to owned strings for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceView {
    pub url: String,
    pub text: String,
}

/// Snapshot of the current question and its answer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentQuestionView {
    pub index: usize,
    pub prompt: String,
    pub choices: Vec<String>,
    pub marked_for_review: bool,
    pub answered: bool,
    /// `Some` once answered, never before.
    pub selected_choice: Option<usize>,
    /// Revealed together with the explanation, only after answering.
    pub correct_choice: Option<usize>,
    pub explanation: Option<String>,
    pub reference: Option<ReferenceView>,
}

impl CurrentQuestionView {
    /// Build the snapshot for the session's current question.
    ///
    /// Returns `None` for an empty bank.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let question = session.current_question()?;
        let state = session.current_state()?;
        Some(Self::build(session.current_index(), question, state))
    }

    fn build(index: usize, question: &Question, state: &QuestionState) -> Self {
        let answered = state.answered();
        let revealed = state.explanation_revealed();

        Self {
            index,
            prompt: question.prompt().to_owned(),
            choices: question.choices().to_vec(),
            marked_for_review: state.marked_for_review(),
            answered,
            selected_choice: state.selected_choice(),
            correct_choice: answered.then(|| question.correct_choice()),
            explanation: revealed.then(|| question.explanation().to_owned()),
            reference: answered
                .then(|| {
                    question.reference().map(|reference| ReferenceView {
                        url: reference.url().to_string(),
                        text: reference.text().to_owned(),
                    })
                })
                .flatten(),
        }
    }
}

/// Sidebar item: one bubble per question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionListItem {
    pub index: usize,
    pub answered: bool,
    /// `Some` once answered: whether the recorded answer was correct.
    pub correct: Option<bool>,
    pub marked_for_review: bool,
    pub is_current: bool,
}

impl QuestionListItem {
    /// One item per question, index-aligned with the bank.
    #[must_use]
    pub fn list(session: &QuizSession) -> Vec<Self> {
        session
            .questions()
            .iter()
            .zip(session.states())
            .enumerate()
            .map(|(index, (question, state))| Self {
                index,
                answered: state.answered(),
                correct: state.is_correct(question),
                marked_for_review: state.marked_for_review(),
                is_current: index == session.current_index(),
            })
            .collect()
    }
}

/// Final-results snapshot produced when the session completes.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalResults {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    pub score_percentage: f64,
    /// Best score on record, including this session if it just set one.
    pub high_score: u32,
    pub is_new_high_score: bool,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
