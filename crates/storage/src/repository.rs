use async_trait::async_trait;
use quiz_core::model::QuestionState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::codec;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for a session: four parallel arrays, index-aligned with
/// the question bank.
///
/// This mirrors the per-question `QuestionState` so stores can
/// serialize/deserialize without leaking storage concerns into the domain
/// layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStateRecord {
    pub answered: Vec<bool>,
    pub explanations_shown: Vec<bool>,
    pub selected_answers: Vec<Option<usize>>,
    pub marked_for_review: Vec<bool>,
}

impl SessionStateRecord {
    /// All-default record for a bank of `question_count` questions.
    #[must_use]
    pub fn default_for(question_count: usize) -> Self {
        Self {
            answered: vec![false; question_count],
            explanations_shown: vec![false; question_count],
            selected_answers: vec![None; question_count],
            marked_for_review: vec![false; question_count],
        }
    }

    #[must_use]
    pub fn from_states(states: &[QuestionState]) -> Self {
        Self {
            answered: states.iter().map(QuestionState::answered).collect(),
            explanations_shown: states
                .iter()
                .map(QuestionState::explanation_revealed)
                .collect(),
            selected_answers: states.iter().map(QuestionState::selected_choice).collect(),
            marked_for_review: states
                .iter()
                .map(QuestionState::marked_for_review)
                .collect(),
        }
    }

    /// Assemble a record from raw store values, entry by entry.
    ///
    /// Each entry that is missing, fails to parse, or has the wrong length is
    /// replaced by its all-default array; the remaining entries are kept.
    #[must_use]
    pub fn from_raw_entries(
        question_count: usize,
        answered: Option<&str>,
        explanations_shown: Option<&str>,
        selected_answers: Option<&str>,
        marked_for_review: Option<&str>,
    ) -> Self {
        fn entry<T: serde::de::DeserializeOwned + Clone>(
            raw: Option<&str>,
            question_count: usize,
            default: T,
        ) -> Vec<T> {
            raw.and_then(codec::decode::<Vec<T>>)
                .filter(|values| values.len() == question_count)
                .unwrap_or_else(|| vec![default; question_count])
        }

        Self {
            answered: entry(answered, question_count, false),
            explanations_shown: entry(explanations_shown, question_count, false),
            selected_answers: entry(selected_answers, question_count, None),
            marked_for_review: entry(marked_for_review, question_count, false),
        }
    }

    /// Whether the record is a plausible session for a bank of size
    /// `question_count`: all arrays have that length and a selected choice is
    /// present exactly where a question is answered.
    #[must_use]
    pub fn is_consistent_for(&self, question_count: usize) -> bool {
        self.answered.len() == question_count
            && self.explanations_shown.len() == question_count
            && self.selected_answers.len() == question_count
            && self.marked_for_review.len() == question_count
            && self
                .answered
                .iter()
                .zip(&self.selected_answers)
                .all(|(answered, selected)| *answered == selected.is_some())
    }

    /// Convert the record back into domain `QuestionState`s.
    ///
    /// Returns `None` when the record is not consistent for the given bank
    /// size; the caller then initializes defaults instead.
    #[must_use]
    pub fn into_states(self, question_count: usize) -> Option<Vec<QuestionState>> {
        if !self.is_consistent_for(question_count) {
            return None;
        }

        (0..question_count)
            .map(|i| {
                QuestionState::from_persisted(
                    self.answered[i],
                    self.explanations_shown[i],
                    self.selected_answers[i],
                    self.marked_for_review[i],
                )
                .ok()
            })
            .collect()
    }
}

/// Store contract for session-scoped quiz progress.
///
/// Writes happen inside the command that caused them, so persisted state
/// never lags the in-memory session once a command returns.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted session for a bank of `question_count` questions.
    ///
    /// Absent or malformed entries come back as all-default arrays; this
    /// never fails for bad data, only for store access problems.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store itself cannot be read.
    async fn load_state(&self, question_count: usize)
    -> Result<SessionStateRecord, StorageError>;

    /// Persist the answer-related arrays (answered, explanations, selected).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entries cannot be written.
    async fn save_answer_state(&self, record: &SessionStateRecord) -> Result<(), StorageError>;

    /// Persist the review-mark array on its own.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be written.
    async fn save_review_marks(&self, marks: &[bool]) -> Result<(), StorageError>;

    /// Discard all session entries. High scores live elsewhere and survive.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entries cannot be removed.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Store contract for the best-score record that outlives sessions.
#[async_trait]
pub trait HighScoreStore: Send + Sync {
    /// Fetch the stored high score, `None` when no session has completed yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn high_score(&self) -> Result<Option<u32>, StorageError>;

    /// Overwrite the stored high score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set_high_score(&self, score: u32) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
///
/// Values are held in their encoded text form so the codec is exercised on
/// every round trip, exactly as with a real key-value backend.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    session: Arc<Mutex<HashMap<String, String>>>,
    persistent: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn session_guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Inject a raw value, bypassing the codec. Test hook for corrupt state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.session_guard()?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn load_state(
        &self,
        question_count: usize,
    ) -> Result<SessionStateRecord, StorageError> {
        let guard = self.session_guard()?;
        Ok(SessionStateRecord::from_raw_entries(
            question_count,
            guard.get(codec::KEY_ANSWERED).map(String::as_str),
            guard.get(codec::KEY_EXPLANATIONS).map(String::as_str),
            guard.get(codec::KEY_SELECTED).map(String::as_str),
            guard.get(codec::KEY_MARKED).map(String::as_str),
        ))
    }

    async fn save_answer_state(&self, record: &SessionStateRecord) -> Result<(), StorageError> {
        let answered = codec::encode(&record.answered)?;
        let explanations = codec::encode(&record.explanations_shown)?;
        let selected = codec::encode(&record.selected_answers)?;

        let mut guard = self.session_guard()?;
        guard.insert(codec::KEY_ANSWERED.to_owned(), answered);
        guard.insert(codec::KEY_EXPLANATIONS.to_owned(), explanations);
        guard.insert(codec::KEY_SELECTED.to_owned(), selected);
        Ok(())
    }

    async fn save_review_marks(&self, marks: &[bool]) -> Result<(), StorageError> {
        let encoded = codec::encode(&marks)?;
        self.session_guard()?
            .insert(codec::KEY_MARKED.to_owned(), encoded);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.session_guard()?.clear();
        Ok(())
    }
}

#[async_trait]
impl HighScoreStore for InMemoryStore {
    async fn high_score(&self) -> Result<Option<u32>, StorageError> {
        let guard = self
            .persistent
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(codec::KEY_HIGH_SCORE)
            .and_then(|raw| codec::decode(raw)))
    }

    async fn set_high_score(&self, score: u32) -> Result<(), StorageError> {
        let encoded = codec::encode(&score)?;
        let mut guard = self
            .persistent
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(codec::KEY_HIGH_SCORE.to_owned(), encoded);
        Ok(())
    }
}

/// Aggregates the two stores behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub session: Arc<dyn SessionStore>,
    pub high_scores: Arc<dyn HighScoreStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        let session: Arc<dyn SessionStore> = Arc::new(store.clone());
        let high_scores: Arc<dyn HighScoreStore> = Arc::new(store);
        Self {
            session,
            high_scores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answered_record() -> SessionStateRecord {
        SessionStateRecord {
            answered: vec![true, false, true],
            explanations_shown: vec![true, false, true],
            selected_answers: vec![Some(1), None, Some(0)],
            marked_for_review: vec![false, true, false],
        }
    }

    #[tokio::test]
    async fn round_trips_session_state() {
        let store = InMemoryStore::new();
        let record = answered_record();

        store.save_answer_state(&record).await.unwrap();
        store
            .save_review_marks(&record.marked_for_review)
            .await
            .unwrap();

        let loaded = store.load_state(3).await.unwrap();
        assert_eq!(loaded, record);
        assert!(loaded.is_consistent_for(3));
    }

    #[tokio::test]
    async fn missing_entries_load_as_defaults() {
        let store = InMemoryStore::new();
        let loaded = store.load_state(2).await.unwrap();
        assert_eq!(loaded, SessionStateRecord::default_for(2));
    }

    #[tokio::test]
    async fn corrupt_entry_defaults_without_touching_others() {
        let store = InMemoryStore::new();
        let record = answered_record();
        store.save_answer_state(&record).await.unwrap();
        store
            .save_review_marks(&record.marked_for_review)
            .await
            .unwrap();
        store.put_raw(crate::codec::KEY_MARKED, "{{{").unwrap();

        let loaded = store.load_state(3).await.unwrap();
        assert_eq!(loaded.answered, record.answered);
        assert_eq!(loaded.marked_for_review, vec![false; 3]);
    }

    #[tokio::test]
    async fn wrong_length_entry_defaults() {
        let store = InMemoryStore::new();
        store.put_raw(crate::codec::KEY_ANSWERED, "[true]").unwrap();

        let loaded = store.load_state(3).await.unwrap();
        assert_eq!(loaded.answered, vec![false; 3]);
    }

    #[tokio::test]
    async fn clear_discards_session_but_keeps_high_score() {
        let store = InMemoryStore::new();
        store.save_answer_state(&answered_record()).await.unwrap();
        store.set_high_score(4).await.unwrap();

        store.clear().await.unwrap();

        let loaded = store.load_state(3).await.unwrap();
        assert_eq!(loaded, SessionStateRecord::default_for(3));
        assert_eq!(store.high_score().await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn high_score_is_absent_until_written() {
        let store = InMemoryStore::new();
        assert_eq!(store.high_score().await.unwrap(), None);

        store.set_high_score(2).await.unwrap();
        store.set_high_score(5).await.unwrap();
        assert_eq!(store.high_score().await.unwrap(), Some(5));
    }

    #[test]
    fn record_detects_selection_mismatch() {
        let mut record = answered_record();
        record.selected_answers[1] = Some(2);
        assert!(!record.is_consistent_for(3));
        assert!(record.into_states(3).is_none());
    }

    #[test]
    fn record_converts_to_states_and_back() {
        let record = answered_record();
        let states = record.clone().into_states(3).unwrap();
        assert!(states[0].answered());
        assert_eq!(states[0].selected_choice(), Some(1));
        assert!(states[1].marked_for_review());

        assert_eq!(SessionStateRecord::from_states(&states), record);
    }
}
