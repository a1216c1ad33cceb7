use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    error::AppResult,
    progression::store::ProgressStore,
    workouts::{
        dto::WorkoutEntryRequest,
        repo_types::{Workout, WorkoutEntry, WorkoutStatus},
    },
};

/// Editable fields of a workout after merging a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutChanges {
    pub name: String,
    pub description: Option<String>,
    pub is_favorite: bool,
}

/// Workout lifecycle persistence on top of the progression store.
///
/// `lock_workout` must keep other writers off the row until the unit of work
/// ends; every status check in the lifecycle is made against that read.
#[async_trait]
pub trait WorkoutStore: ProgressStore {
    async fn lock_workout(&mut self, workout_id: Uuid) -> AppResult<Workout>;

    /// Entries in display order.
    async fn entries(&mut self, workout_id: Uuid) -> AppResult<Vec<WorkoutEntry>>;

    /// Stores the completion and flags every entry as done.
    async fn mark_completed(
        &mut self,
        workout_id: Uuid,
        total_points: i64,
        completed_at: OffsetDateTime,
    ) -> AppResult<Workout>;

    async fn set_status(&mut self, workout_id: Uuid, status: WorkoutStatus) -> AppResult<Workout>;

    async fn update_details(
        &mut self,
        workout_id: Uuid,
        changes: &WorkoutChanges,
    ) -> AppResult<Workout>;

    async fn replace_entries(
        &mut self,
        workout_id: Uuid,
        entries: &[WorkoutEntryRequest],
    ) -> AppResult<()>;

    async fn delete_workout(&mut self, workout_id: Uuid) -> AppResult<()>;
}
