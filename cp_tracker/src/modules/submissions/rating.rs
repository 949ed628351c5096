use crate::{modules::error::TrackerError, types::tables::User};
use sqlx::{Pool, Sqlite, Transaction};

type Result<T> = std::result::Result<T, TrackerError>;

pub struct RatingUpdater<'a> {
    pool: &'a Pool<Sqlite>,
}

impl<'a> RatingUpdater<'a> {
    pub fn new(pool: &'a Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Stores `rating` on an already fetched submission.
    ///
    /// Submissions are never created here; the problem must have come through a fetch first.
    pub async fn rate(&self, handle: &str, problem_id: &str, rating: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        match Self::rate_in(&mut tx, handle, problem_id, rating).await {
            Ok(()) => {
                tx.commit().await?;
                tracing::info!("Rating of {} by {} set to {}.", problem_id, handle, rating);
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!("failed to rollback rating of {}: {:?}", problem_id, rollback);
                }
                Err(e)
            }
        }
    }

    async fn rate_in(
        tx: &mut Transaction<'_, Sqlite>,
        handle: &str,
        problem_id: &str,
        rating: i64,
    ) -> Result<()> {
        // Write first so the transaction never upgrades a read snapshot.
        let updated = sqlx::query(
            r#"
            UPDATE "submissions"
            SET "user_elo" = ?, "updated_at" = CURRENT_TIMESTAMP
            WHERE
                "user_id" = (SELECT "id" FROM "users" WHERE "cf_handle" = ?)
                AND "problem_id" = ?
            "#,
        )
        .bind(rating)
        .bind(handle)
        .bind(problem_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() > 0 {
            return Ok(());
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT "id", "cf_handle", "created_at" FROM "users" WHERE "cf_handle" = ?
            "#,
        )
        .bind(handle)
        .fetch_optional(&mut *tx)
        .await?;

        match user {
            Some(_) => Err(TrackerError::SubmissionNotFound),
            None => Err(TrackerError::UserNotFound),
        }
    }
}
