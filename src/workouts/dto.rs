use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    achievements::dto::{AchievementDto, UnlockedAchievementDto},
    exercises::repo_types::Category,
    progression::services::Unlocked,
    users::dto::UserDto,
    workouts::{
        repo_types::{Workout, WorkoutEntry, WorkoutStatus},
        services::total_points,
    },
};

#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutEntryRequest {
    pub exercise_id: Uuid,
    #[serde(default = "default_sets")]
    pub sets: i32,
    #[serde(default = "default_reps")]
    pub reps: i32,
    #[serde(default = "default_rest")]
    pub rest_seconds: i32,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}
fn default_sets() -> i32 {
    3
}
fn default_reps() -> i32 {
    10
}
fn default_rest() -> i32 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkoutRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub exercises: Vec<WorkoutEntryRequest>,
}

/// Omitted fields keep their current value.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkoutRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Option<Vec<WorkoutEntryRequest>>,
    #[serde(default)]
    pub favorite: Option<bool>,
}

/// Sets the flag rather than flipping it, so retries are harmless.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteRequest {
    pub favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct WorkoutEntryDto {
    pub id: Uuid,
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

impl From<&WorkoutEntry> for WorkoutEntryDto {
    fn from(e: &WorkoutEntry) -> Self {
        Self {
            id: e.id,
            exercise_id: e.exercise_id,
            exercise_name: e.exercise_name.clone(),
            category: e.category,
            points_reward: e.points_reward,
            sets: e.sets,
            reps: e.reps,
            rest_seconds: e.rest_seconds,
            order_index: e.order_index,
            notes: e.notes.clone(),
            is_completed: e.is_completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkoutDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: WorkoutStatus,
    pub total_points: i64,
    /// What completing it now would pay.
    pub estimated_points: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub is_favorite: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub exercises: Vec<WorkoutEntryDto>,
}

impl WorkoutDto {
    pub fn new(w: &Workout, entries: &[WorkoutEntry]) -> Self {
        Self {
            id: w.id,
            name: w.name.clone(),
            description: w.description.clone(),
            status: w.status,
            total_points: w.total_points,
            estimated_points: total_points(entries),
            completed_at: w.completed_at,
            is_favorite: w.is_favorite,
            created_at: w.created_at,
            updated_at: w.updated_at,
            exercises: entries.iter().map(WorkoutEntryDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionDto {
    pub workout: WorkoutDto,
    pub user: UserDto,
    pub points_awarded: i64,
    pub unlocked: Vec<UnlockedAchievementDto>,
}

impl From<&Unlocked> for UnlockedAchievementDto {
    fn from(u: &Unlocked) -> Self {
        Self {
            achievement: AchievementDto::from(&u.achievement),
            unlocked_at: u.record.unlocked_at,
            progress_value: u.record.progress_value,
        }
    }
}
