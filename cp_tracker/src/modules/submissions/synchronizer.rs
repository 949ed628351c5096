use crate::{
    modules::{
        error::TrackerError,
        models::response::SolvedProblem,
        submissions::reconciler::{reconcile, Reconciliation},
    },
    types::tables::{Submission, User},
};
use cp_tracker_libs::{codeforces::model, JudgeClient};
use sqlx::{Pool, Sqlite, Transaction};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, TrackerError>;

pub struct SubmissionSynchronizer<'a, C: JudgeClient + ?Sized> {
    pool: &'a Pool<Sqlite>,
    client: &'a C,
}

impl<'a, C: JudgeClient + ?Sized> SubmissionSynchronizer<'a, C> {
    pub fn new(pool: &'a Pool<Sqlite>, client: &'a C) -> Self {
        Self { pool, client }
    }

    /// Retrieves the submission history of `handle`, newest first.
    ///
    /// Nothing touches the database here, so a failing judge leaves the store as it was.
    pub async fn fetch(&self, handle: &str) -> Result<Vec<model::Submission>> {
        let history = self.client.user_status(handle).await?;
        tracing::info!("{} submissions of {} retrieved.", history.len(), handle);

        Ok(history)
    }

    /// Merges `history` with the stored ratings and saves the newly solved problems.
    ///
    /// Creating the user and inserting the new records share one transaction,
    /// which is rolled back on any error.
    pub async fn save(
        &self,
        handle: &str,
        history: &[model::Submission],
    ) -> Result<Vec<SolvedProblem>> {
        let mut tx = self.pool.begin().await?;

        match Self::reconcile_in(&mut tx, handle, history).await {
            Ok(reconciliation) => {
                tx.commit().await?;
                tracing::info!(
                    "{} solved problems of {} merged, {} of them newly saved.",
                    reconciliation.solved.len(),
                    handle,
                    reconciliation.unseen.len()
                );
                Ok(reconciliation.solved)
            }
            Err(e) => {
                tracing::error!("an error occurred at saving submissions of {}: {:?}", handle, e);
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!("failed to rollback saving of {}: {:?}", handle, rollback);
                }
                Err(e)
            }
        }
    }

    async fn reconcile_in(
        tx: &mut Transaction<'_, Sqlite>,
        handle: &str,
        history: &[model::Submission],
    ) -> Result<Reconciliation> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO "users" ("cf_handle") VALUES (?)
            ON CONFLICT ("cf_handle") DO NOTHING
            "#,
        )
        .bind(handle)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() > 0 {
            tracing::info!("User {} has been added to the database.", handle);
        }

        let user: User = sqlx::query_as(
            r#"
            SELECT "id", "cf_handle", "created_at" FROM "users" WHERE "cf_handle" = ?
            "#,
        )
        .bind(handle)
        .fetch_one(&mut *tx)
        .await?;

        let stored: HashMap<String, Option<i64>> = sqlx::query_as::<_, Submission>(
            r#"
            SELECT
                "id",
                "problem_id",
                "problem_name",
                "user_elo",
                "user_id",
                "created_at",
                "updated_at"
            FROM
                "submissions"
            WHERE
                "user_id" = ?
            "#,
        )
        .bind(user.id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|submission| (submission.problem_id, submission.user_elo))
        .collect();

        let reconciliation = reconcile(history, &stored);

        for new in reconciliation.unseen.iter() {
            sqlx::query(
                r#"
                INSERT INTO "submissions" ("problem_id", "problem_name", "user_id")
                VALUES (?, ?, ?)
                ON CONFLICT ("user_id", "problem_id") DO NOTHING
                "#,
            )
            .bind(&new.problem_id)
            .bind(&new.problem_name)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        }

        Ok(reconciliation)
    }

    /// Fetches and saves in one go.
    pub async fn run(&self, handle: &str) -> Result<Vec<SolvedProblem>> {
        let history = self.fetch(handle).await?;
        self.save(handle, &history).await
    }
}
