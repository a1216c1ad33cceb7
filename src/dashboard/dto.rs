use serde::Serialize;

use crate::{
    achievements::dto::UnlockedAchievementDto, progression::leveling::Badge, users::dto::UserDto,
    workouts::dto::WorkoutDto,
};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_workouts: i64,
    pub total_points: i64,
    pub current_level: i32,
    pub badge: Badge,
    pub points_for_next_level: i64,
    pub achievements_unlocked: i64,
    pub workouts_last_7_days: i64,
    pub workouts_last_30_days: i64,
    pub average_points_per_workout: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardDto {
    pub user: UserDto,
    pub stats: DashboardStats,
    pub recent_workouts: Vec<WorkoutDto>,
    pub favorite_workouts: Vec<WorkoutDto>,
    pub recent_achievements: Vec<UnlockedAchievementDto>,
}
