use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::progression::leveling::UserStats;

/// User record in the database, keyed by the identity provider subject.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_points: i64,
    pub current_level: i32,
    pub workouts_completed: i64,
    pub is_active: bool,
    pub last_workout_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn stats(&self) -> UserStats {
        UserStats {
            total_points: self.total_points,
            current_level: self.current_level,
            workouts_completed: self.workouts_completed,
        }
    }

    pub fn set_stats(&mut self, stats: UserStats) {
        self.total_points = stats.total_points;
        self.current_level = stats.current_level;
        self.workouts_completed = stats.workouts_completed;
    }
}

/// Identity fields taken from a verified token.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Leaderboard row: a user plus their unlock count.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub username: String,
    pub total_points: i64,
    pub current_level: i32,
    pub workouts_completed: i64,
    pub achievements_count: i64,
}
