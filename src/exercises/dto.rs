use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exercises::repo_types::{Category, Difficulty, Exercise};

#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_points")]
    pub points_reward: i64,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub category: Category,
    #[serde(default)]
    pub estimated_duration_minutes: Option<i32>,
    /// Omitted: active on create, unchanged on update.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ExerciseRequest {
    pub fn active_on_create(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}
fn default_points() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct ExerciseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub points_reward: i64,
    pub difficulty: Difficulty,
    pub category: Category,
    pub estimated_duration_minutes: Option<i32>,
    pub is_active: bool,
}

impl From<&Exercise> for ExerciseDto {
    fn from(e: &Exercise) -> Self {
        Self {
            id: e.id,
            name: e.name.clone(),
            description: e.description.clone(),
            points_reward: e.points_reward,
            difficulty: e.difficulty,
            category: e.category,
            estimated_duration_minutes: e.estimated_duration_minutes,
            is_active: e.is_active,
        }
    }
}
