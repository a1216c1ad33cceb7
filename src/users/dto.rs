use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{progression::leveling::Badge, users::repo_types::User};

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_points: i64,
    pub current_level: i32,
    pub badge: Badge,
    pub points_for_next_level: i64,
    pub workouts_completed: i64,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_workout_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for UserDto {
    fn from(u: &User) -> Self {
        let stats = u.stats();
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            total_points: u.total_points,
            current_level: u.current_level,
            badge: stats.badge(),
            points_for_next_level: stats.points_for_next_level(),
            workouts_completed: u.workouts_completed,
            is_active: u.is_active,
            last_workout_at: u.last_workout_at,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: UserDto,
    pub achievements_count: i64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub total_points: i64,
    pub current_level: i32,
    pub badge: Badge,
    pub workouts_completed: i64,
    pub achievements_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}
fn default_size() -> i64 {
    100
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total: i64,
}
