use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "exercise_difficulty", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    VeryEasy,
    Easy,
    #[default]
    Medium,
    Hard,
    VeryHard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "exercise_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Cardio,
    Strength,
    Flexibility,
    Balance,
    Endurance,
    Hiit,
    Yoga,
    Crossfit,
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Case-insensitive, so `/category/strength` works as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CARDIO" => Ok(Category::Cardio),
            "STRENGTH" => Ok(Category::Strength),
            "FLEXIBILITY" => Ok(Category::Flexibility),
            "BALANCE" => Ok(Category::Balance),
            "ENDURANCE" => Ok(Category::Endurance),
            "HIIT" => Ok(Category::Hiit),
            "YOGA" => Ok(Category::Yoga),
            "CROSSFIT" => Ok(Category::Crossfit),
            other => Err(format!("unknown category {other}")),
        }
    }
}

/// Catalog exercise.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub points_reward: i64,
    pub difficulty: Difficulty,
    pub category: Category,
    pub estimated_duration_minutes: Option<i32>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
