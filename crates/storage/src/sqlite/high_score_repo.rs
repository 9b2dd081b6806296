use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{HighScoreStore, StorageError};

use super::SqliteRepository;

#[async_trait]
impl HighScoreStore for SqliteRepository {
    async fn high_score(&self) -> Result<Option<u32>, StorageError> {
        let row = sqlx::query("SELECT best FROM high_scores WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let best: i64 = row
            .try_get("best")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(u32::try_from(best).ok())
    }

    async fn set_high_score(&self, score: u32) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO high_scores (id, best)
            VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET
                best = excluded.best
            ",
        )
        .bind(i64::from(score))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
