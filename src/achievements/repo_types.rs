use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "achievement_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementKind {
    WorkoutCount,
    TotalPoints,
    LevelReached,
    /// Distinct exercises across all completed workouts.
    CategoryMaster,
    ConsecutiveDays,
    SpecificExercise,
}

impl AchievementKind {
    /// Kinds the evaluator checks on its own; the rest need a manual grant.
    pub fn is_automatic(&self) -> bool {
        matches!(
            self,
            AchievementKind::WorkoutCount
                | AchievementKind::TotalPoints
                | AchievementKind::LevelReached
                | AchievementKind::CategoryMaster
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "achievement_rarity", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementRarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Achievement catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: AchievementKind,
    pub icon_url: Option<String>,
    pub required_value: Option<i64>,
    pub points_reward: i64,
    pub rarity: AchievementRarity,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Permanent proof that a user satisfied an achievement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UnlockRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub unlocked_at: OffsetDateTime,
    pub progress_value: Option<i64>,
}
