use async_trait::async_trait;
use sqlx::Row;

use crate::codec;
use crate::repository::{SessionStateRecord, SessionStore, StorageError};

use super::SqliteRepository;

impl SqliteRepository {
    async fn get_entry(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM session_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        match row {
            Some(row) => row
                .try_get::<String, _>("value")
                .map(Some)
                .map_err(|err| StorageError::Serialization(err.to_string())),
            None => Ok(None),
        }
    }

    async fn put_entry(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO session_state (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteRepository {
    async fn load_state(
        &self,
        question_count: usize,
    ) -> Result<SessionStateRecord, StorageError> {
        let answered = self.get_entry(codec::KEY_ANSWERED).await?;
        let explanations = self.get_entry(codec::KEY_EXPLANATIONS).await?;
        let selected = self.get_entry(codec::KEY_SELECTED).await?;
        let marked = self.get_entry(codec::KEY_MARKED).await?;

        Ok(SessionStateRecord::from_raw_entries(
            question_count,
            answered.as_deref(),
            explanations.as_deref(),
            selected.as_deref(),
            marked.as_deref(),
        ))
    }

    async fn save_answer_state(&self, record: &SessionStateRecord) -> Result<(), StorageError> {
        self.put_entry(codec::KEY_ANSWERED, &codec::encode(&record.answered)?)
            .await?;
        self.put_entry(
            codec::KEY_EXPLANATIONS,
            &codec::encode(&record.explanations_shown)?,
        )
        .await?;
        self.put_entry(codec::KEY_SELECTED, &codec::encode(&record.selected_answers)?)
            .await?;
        Ok(())
    }

    async fn save_review_marks(&self, marks: &[bool]) -> Result<(), StorageError> {
        self.put_entry(codec::KEY_MARKED, &codec::encode(&marks)?)
            .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_state")
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
