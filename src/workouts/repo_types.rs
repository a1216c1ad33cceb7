use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::exercises::repo_types::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workout_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutStatus {
    Planned,
    Completed,
    Cancelled,
}

/// A user's routine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: WorkoutStatus,
    /// Points credited at the last completion.
    pub total_points: i64,
    pub completed_at: Option<OffsetDateTime>,
    pub is_favorite: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Workout entry joined with the catalog exercise it references.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutEntry {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub category: Category,
    pub points_reward: i64,
    pub sets: i32,
    pub reps: i32,
    pub rest_seconds: i32,
    pub order_index: i32,
    pub notes: Option<String>,
    pub is_completed: bool,
}

/// Which slice of a user's workouts to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutFilter {
    All,
    Favorites,
    Completed,
}
