use serde::Serialize;

use crate::{achievements::dto::UnlockedAchievementDto, users::dto::UserDto};

/// Result of a manual grant, including anything the reward went on to unlock.
#[derive(Debug, Serialize)]
pub struct GrantDto {
    pub user: UserDto,
    pub points_awarded: i64,
    pub unlocked: Vec<UnlockedAchievementDto>,
}
