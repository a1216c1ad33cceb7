use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    progression::pg::PgProgressStore,
    workouts::{
        dto::WorkoutEntryRequest,
        repo_types::{Workout, WorkoutEntry, WorkoutStatus},
        store::{WorkoutChanges, WorkoutStore},
    },
};

#[async_trait]
impl WorkoutStore for PgProgressStore<'_> {
    async fn lock_workout(&mut self, workout_id: Uuid) -> AppResult<Workout> {
        Workout::find_for_update(self.conn(), workout_id)
            .await?
            .ok_or(AppError::NotFound("workout"))
    }

    async fn entries(&mut self, workout_id: Uuid) -> AppResult<Vec<WorkoutEntry>> {
        Ok(WorkoutEntry::list(self.conn(), workout_id).await?)
    }

    async fn mark_completed(
        &mut self,
        workout_id: Uuid,
        total_points: i64,
        completed_at: OffsetDateTime,
    ) -> AppResult<Workout> {
        let workout =
            Workout::mark_completed(self.conn(), workout_id, total_points, completed_at).await?;
        WorkoutEntry::mark_all_completed(self.conn(), workout_id).await?;
        Ok(workout)
    }

    async fn set_status(&mut self, workout_id: Uuid, status: WorkoutStatus) -> AppResult<Workout> {
        Ok(Workout::set_status(self.conn(), workout_id, status).await?)
    }

    async fn update_details(
        &mut self,
        workout_id: Uuid,
        changes: &WorkoutChanges,
    ) -> AppResult<Workout> {
        Ok(Workout::update_details(
            self.conn(),
            workout_id,
            &changes.name,
            changes.description.as_deref(),
            changes.is_favorite,
        )
        .await?)
    }

    async fn replace_entries(
        &mut self,
        workout_id: Uuid,
        entries: &[WorkoutEntryRequest],
    ) -> AppResult<()> {
        WorkoutEntry::delete_for_workout(self.conn(), workout_id).await?;
        WorkoutEntry::insert_all(self.conn(), workout_id, entries).await?;
        Ok(())
    }

    async fn delete_workout(&mut self, workout_id: Uuid) -> AppResult<()> {
        Workout::delete(self.conn(), workout_id).await?;
        Ok(())
    }
}
