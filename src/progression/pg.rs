use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use super::store::ProgressStore;
use crate::{
    achievements::repo_types::{Achievement, UnlockRecord},
    error::{AppError, AppResult},
    users::repo_types::User,
    workouts::repo_types::WorkoutEntry,
};

/// `ProgressStore` over an open transaction. The user row is read with
/// `FOR UPDATE`, so concurrent passes for one user run one after another.
pub struct PgProgressStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgProgressStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// The transaction's connection, for stores layered on this one.
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        &mut *self.conn
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore<'_> {
    async fn get_user(&mut self, user_id: Uuid) -> AppResult<User> {
        User::find_for_update(&mut *self.conn, user_id)
            .await?
            .ok_or(AppError::NotFound("user"))
    }

    async fn save_user(&mut self, user: &User) -> AppResult<()> {
        User::save_stats(&mut *self.conn, user).await?;
        Ok(())
    }

    async fn list_active_achievements(&mut self) -> AppResult<Vec<Achievement>> {
        Ok(Achievement::list_active(&mut *self.conn).await?)
    }

    async fn get_achievement(&mut self, achievement_id: Uuid) -> AppResult<Achievement> {
        Achievement::find(&mut *self.conn, achievement_id)
            .await?
            .ok_or(AppError::NotFound("achievement"))
    }

    async fn unlocked_achievement_ids(&mut self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        let ids = UnlockRecord::achievement_ids(&mut *self.conn, user_id).await?;
        Ok(ids.into_iter().collect())
    }

    async fn unlock_exists(&mut self, user_id: Uuid, achievement_id: Uuid) -> AppResult<bool> {
        Ok(UnlockRecord::exists(&mut *self.conn, user_id, achievement_id).await?)
    }

    async fn create_unlock(
        &mut self,
        user_id: Uuid,
        achievement_id: Uuid,
        unlocked_at: OffsetDateTime,
        progress_value: Option<i64>,
    ) -> AppResult<UnlockRecord> {
        UnlockRecord::insert(
            &mut *self.conn,
            user_id,
            achievement_id,
            unlocked_at,
            progress_value,
        )
        .await?
        .ok_or(AppError::AlreadyUnlocked {
            user_id,
            achievement_id,
        })
    }

    async fn count_distinct_completed_exercises(&mut self, user_id: Uuid) -> AppResult<i64> {
        Ok(WorkoutEntry::count_distinct_completed(&mut *self.conn, user_id).await?)
    }
}
