use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::achievements::{
    repo::UnlockedAchievementRow,
    repo_types::{Achievement, AchievementKind, AchievementRarity},
};

#[derive(Debug, Clone, Deserialize)]
pub struct AchievementRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: AchievementKind,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub required_value: Option<i64>,
    #[serde(default = "default_reward")]
    pub points_reward: i64,
    #[serde(default)]
    pub rarity: AchievementRarity,
    /// Omitted: active on create, unchanged on update.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl AchievementRequest {
    pub fn active_on_create(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}
fn default_reward() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct AchievementDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: AchievementKind,
    pub icon_url: Option<String>,
    pub required_value: Option<i64>,
    pub points_reward: i64,
    pub rarity: AchievementRarity,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&Achievement> for AchievementDto {
    fn from(a: &Achievement) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            description: a.description.clone(),
            kind: a.kind,
            icon_url: a.icon_url.clone(),
            required_value: a.required_value,
            points_reward: a.points_reward,
            rarity: a.rarity,
            is_active: a.is_active,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnlockedAchievementDto {
    #[serde(flatten)]
    pub achievement: AchievementDto,
    #[serde(with = "time::serde::rfc3339")]
    pub unlocked_at: OffsetDateTime,
    pub progress_value: Option<i64>,
}

impl From<&UnlockedAchievementRow> for UnlockedAchievementDto {
    fn from(row: &UnlockedAchievementRow) -> Self {
        Self {
            achievement: AchievementDto::from(&row.achievement),
            unlocked_at: row.unlocked_at,
            progress_value: row.progress_value,
        }
    }
}
