use std::sync::Arc;

use quiz_core::model::Question;
use storage::repository::{HighScoreStore, SessionStore, Storage};
use tracing::{debug, info, warn};

use super::service::{Advance, QuizSession};
use super::view::FinalResults;
use crate::error::SessionError;

/// Orchestrates the quiz session against the two stores.
///
/// Commands run one at a time to completion; every store write happens inside
/// the command that caused it, so persisted state never lags the in-memory
/// session once a command returns. Store *reads* degrade to defaults, store
/// *writes* propagate their error.
#[derive(Clone)]
pub struct QuizService {
    session_store: Arc<dyn SessionStore>,
    high_scores: Arc<dyn HighScoreStore>,
}

impl QuizService {
    #[must_use]
    pub fn new(session_store: Arc<dyn SessionStore>, high_scores: Arc<dyn HighScoreStore>) -> Self {
        Self {
            session_store,
            high_scores,
        }
    }

    #[must_use]
    pub fn with_storage(storage: &Storage) -> Self {
        Self::new(Arc::clone(&storage.session), Arc::clone(&storage.high_scores))
    }

    /// Start a session for the given bank, resuming persisted progress when a
    /// usable record exists.
    ///
    /// A store read failure is recovered locally: the session starts fresh.
    pub async fn start(&self, questions: Vec<Question>) -> QuizSession {
        let record = match self.session_store.load_state(questions.len()).await {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(error = %err, "session store unreadable; starting fresh");
                None
            }
        };
        QuizSession::restore(questions, record)
    }

    /// Answer the current question and persist the updated state.
    ///
    /// The idempotent no-op path (question already answered) skips the store
    /// write entirely.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the state cannot be written.
    pub async fn answer(
        &self,
        session: &mut QuizSession,
        choice: usize,
    ) -> Result<bool, SessionError> {
        if !session.answer(choice) {
            return Ok(false);
        }

        self.session_store
            .save_answer_state(&session.state_record())
            .await?;
        debug!(
            index = session.current_index(),
            choice, "answer recorded and persisted"
        );
        Ok(true)
    }

    /// Toggle the current question's review mark and persist the mark array.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the marks cannot be written.
    pub async fn toggle_review_mark(
        &self,
        session: &mut QuizSession,
    ) -> Result<bool, SessionError> {
        let marked = session.toggle_review_mark();
        let record = session.state_record();
        self.session_store
            .save_review_marks(&record.marked_for_review)
            .await?;
        Ok(marked)
    }

    /// Advance to the next question, or finish the session when already at
    /// the last one.
    ///
    /// Completion is a navigation event, not a correctness gate: unanswered
    /// questions simply count toward neither tally.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if a new high score cannot be written.
    pub async fn advance(
        &self,
        session: &mut QuizSession,
    ) -> Result<Option<FinalResults>, SessionError> {
        match session.navigate_next() {
            Advance::Moved(_) => Ok(None),
            Advance::Completed => self.finish(session).await.map(Some),
        }
    }

    async fn finish(&self, session: &QuizSession) -> Result<FinalResults, SessionError> {
        let score = session.score();

        // A missing or unreadable record counts as 0, so the first completed
        // session with any correct answer sets a high score.
        let previous = match self.high_scores.high_score().await {
            Ok(best) => best.unwrap_or(0),
            Err(err) => {
                warn!(error = %err, "high-score store unreadable; treating as 0");
                0
            }
        };

        let is_new_high_score = score.correct() > previous;
        if is_new_high_score {
            self.high_scores.set_high_score(score.correct()).await?;
            info!(score = score.correct(), previous, "new high score");
        }

        Ok(FinalResults {
            total: score.total(),
            correct: score.correct(),
            incorrect: score.incorrect(),
            unanswered: score.unanswered(),
            score_percentage: score.percentage(),
            high_score: if is_new_high_score {
                score.correct()
            } else {
                previous
            },
            is_new_high_score,
        })
    }

    /// Tear the session down: discard all session-store entries and reset
    /// every question state. The high score survives.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the session store cannot be
    /// cleared.
    pub async fn restart(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        self.session_store.clear().await?;
        session.restart();
        debug!("session restarted");
        Ok(())
    }

    /// Re-enter answering mode from the results view. Pure presentation
    /// transition; nothing is persisted.
    pub fn review(&self, session: &mut QuizSession) {
        session.review();
    }

    /// Jump to a question. Position is not persisted; a reload resumes at
    /// question 0.
    pub fn navigate_to(&self, session: &mut QuizSession, index: usize) {
        session.navigate_to(index);
    }

    /// Step back one question; no-op at index 0.
    pub fn navigate_previous(&self, session: &mut QuizSession) {
        session.navigate_previous();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;
    use storage::repository::StorageError;

    fn build_question(correct: usize) -> Question {
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

    fn bank() -> Vec<Question> {
        vec![build_question(1), build_question(0), build_question(2)]
    }

    fn service() -> (QuizService, Storage) {
        let storage = Storage::in_memory();
        (QuizService::with_storage(&storage), storage)
    }

    #[tokio::test]
    async fn answers_persist_across_restarts_of_the_session_object() {
        let (service, _storage) = service();

        let mut session = service.start(bank()).await;
        assert!(service.answer(&mut session, 1).await.unwrap());
        service.navigate_to(&mut session, 1);
        assert!(service.answer(&mut session, 1).await.unwrap());

        // Simulate a page reload: build a new session from the same stores.
        let resumed = service.start(bank()).await;
        assert_eq!(resumed.answered_count(), 2);
        assert_eq!(resumed.score().correct(), 1);
        assert_eq!(resumed.score().incorrect(), 1);
        assert_eq!(resumed.current_index(), 0);
    }

    #[tokio::test]
    async fn second_answer_skips_the_store_write() {
        let (service, _storage) = service();
        let mut session = service.start(bank()).await;

        assert!(service.answer(&mut session, 2).await.unwrap());
        assert!(!service.answer(&mut session, 0).await.unwrap());
        assert_eq!(session.current_state().unwrap().selected_choice(), Some(2));
    }

    #[tokio::test]
    async fn completion_reports_score_and_sets_high_score() {
        let (service, storage) = service();
        let mut session = service.start(bank()).await;

        // Q0 correct, Q1 incorrect, Q2 left unanswered.
        service.answer(&mut session, 1).await.unwrap();
        assert!(service.advance(&mut session).await.unwrap().is_none());
        service.answer(&mut session, 1).await.unwrap();
        assert!(service.advance(&mut session).await.unwrap().is_none());

        let results = service.advance(&mut session).await.unwrap().unwrap();
        assert_eq!(results.correct, 1);
        assert_eq!(results.incorrect, 1);
        assert_eq!(results.unanswered, 1);
        assert!((results.score_percentage - 100.0 / 3.0).abs() < 1e-9);
        assert!(results.is_new_high_score);
        assert_eq!(results.high_score, 1);
        assert_eq!(storage.high_scores.high_score().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn high_score_updates_only_on_strict_improvement() {
        let (service, storage) = service();
        storage.high_scores.set_high_score(1).await.unwrap();

        let mut session = service.start(bank()).await;
        service.answer(&mut session, 1).await.unwrap();
        service.advance(&mut session).await.unwrap();
        service.answer(&mut session, 0).await.unwrap();
        service.advance(&mut session).await.unwrap();

        let results = service.advance(&mut session).await.unwrap().unwrap();
        assert_eq!(results.correct, 2);
        assert!(results.is_new_high_score);
        assert_eq!(results.high_score, 2);

        // Run a weaker session; the stored best must not move.
        service.restart(&mut session).await.unwrap();
        session.navigate_to(2);
        let results = service.advance(&mut session).await.unwrap().unwrap();
        assert!(!results.is_new_high_score);
        assert_eq!(results.high_score, 2);
        assert_eq!(storage.high_scores.high_score().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn equal_score_is_not_a_new_high_score() {
        let (service, storage) = service();
        storage.high_scores.set_high_score(1).await.unwrap();

        let mut session = service.start(bank()).await;
        service.answer(&mut session, 1).await.unwrap();
        session.navigate_to(2);
        let results = service.advance(&mut session).await.unwrap().unwrap();

        assert_eq!(results.correct, 1);
        assert!(!results.is_new_high_score);
        assert_eq!(storage.high_scores.high_score().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn restart_clears_session_store_but_not_high_score() {
        let (service, storage) = service();
        let mut session = service.start(bank()).await;

        service.answer(&mut session, 1).await.unwrap();
        service.toggle_review_mark(&mut session).await.unwrap();
        storage.high_scores.set_high_score(3).await.unwrap();

        service.restart(&mut session).await.unwrap();
        assert_eq!(session.answered_count(), 0);

        let resumed = service.start(bank()).await;
        assert_eq!(resumed.answered_count(), 0);
        assert!(resumed.states().iter().all(|s| !s.marked_for_review()));
        assert_eq!(storage.high_scores.high_score().await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn review_marks_survive_a_reload_on_their_own() {
        let (service, _storage) = service();
        let mut session = service.start(bank()).await;

        service.navigate_to(&mut session, 1);
        assert!(service.toggle_review_mark(&mut session).await.unwrap());

        let resumed = service.start(bank()).await;
        assert!(resumed.states()[1].marked_for_review());
        assert_eq!(resumed.answered_count(), 0);
    }

    #[tokio::test]
    async fn unreadable_session_store_starts_fresh() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl SessionStore for FailingStore {
            async fn load_state(
                &self,
                _question_count: usize,
            ) -> Result<storage::repository::SessionStateRecord, StorageError> {
                Err(StorageError::Connection("down".to_owned()))
            }
            async fn save_answer_state(
                &self,
                _record: &storage::repository::SessionStateRecord,
            ) -> Result<(), StorageError> {
                Ok(())
            }
            async fn save_review_marks(&self, _marks: &[bool]) -> Result<(), StorageError> {
                Ok(())
            }
            async fn clear(&self) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let storage = Storage::in_memory();
        let service = QuizService::new(Arc::new(FailingStore), storage.high_scores);

        let session = service.start(bank()).await;
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.question_count(), 3);
    }
}
