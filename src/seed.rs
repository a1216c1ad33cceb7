use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use crate::{
    achievements::{
        dto::AchievementRequest,
        repo_types::{Achievement, AchievementKind, AchievementRarity},
    },
    exercises::{
        dto::ExerciseRequest,
        repo_types::{Category, Difficulty, Exercise},
    },
};

/// Fills empty catalog tables with a starter set. Tables that already
/// hold rows are left alone.
pub async fn seed_catalog(db: &PgPool) -> anyhow::Result<()> {
    if Exercise::count(db).await? == 0 {
        let exercises = starter_exercises();
        for req in &exercises {
            Exercise::create(db, req)
                .await
                .with_context(|| format!("seeding exercise {}", req.name))?;
        }
        info!(count = exercises.len(), "seeded exercises");
    }

    if Achievement::count(db).await? == 0 {
        let achievements = starter_achievements();
        for req in &achievements {
            Achievement::create(db, req)
                .await
                .with_context(|| format!("seeding achievement {}", req.name))?;
        }
        info!(count = achievements.len(), "seeded achievements");
    }
    Ok(())
}

fn exercise(
    name: &str,
    description: &str,
    points: i64,
    difficulty: Difficulty,
    category: Category,
    minutes: i32,
) -> ExerciseRequest {
    ExerciseRequest {
        name: name.into(),
        description: Some(description.into()),
        points_reward: points,
        difficulty,
        category,
        estimated_duration_minutes: Some(minutes),
        is_active: None,
    }
}

fn achievement(
    name: &str,
    description: &str,
    kind: AchievementKind,
    required: i64,
    reward: i64,
    rarity: AchievementRarity,
) -> AchievementRequest {
    AchievementRequest {
        name: name.into(),
        description: Some(description.into()),
        kind,
        icon_url: None,
        required_value: Some(required),
        points_reward: reward,
        rarity,
        is_active: None,
    }
}

pub fn starter_exercises() -> Vec<ExerciseRequest> {
    use Category::*;
    use Difficulty::*;
    vec![
        exercise("Push-ups", "Classic upper body push", 10, Easy, Strength, 10),
        exercise("Squats", "Bodyweight squats", 10, Easy, Strength, 10),
        exercise("Plank", "Hold a straight plank", 15, Medium, Endurance, 5),
        exercise("Burpees", "Full body explosive move", 25, Hard, Hiit, 10),
        exercise("Running", "Steady pace run", 30, Medium, Cardio, 30),
        exercise("Jump Rope", "Skipping intervals", 20, Medium, Cardio, 15),
        exercise("Sun Salutation", "Yoga flow sequence", 15, Easy, Yoga, 20),
        exercise("Hamstring Stretch", "Seated forward fold", 5, VeryEasy, Flexibility, 5),
        exercise("Single-leg Stand", "Balance on one leg", 5, VeryEasy, Balance, 5),
        exercise("Murph", "Run, pull-ups, push-ups, squats, run", 100, VeryHard, Crossfit, 60),
    ]
}

pub fn starter_achievements() -> Vec<AchievementRequest> {
    use AchievementKind::*;
    use AchievementRarity::*;
    vec![
        achievement("First Win", "Complete your first workout", WorkoutCount, 1, 50, Common),
        achievement("Getting Serious", "Complete 10 workouts", WorkoutCount, 10, 100, Uncommon),
        achievement("Dedicated", "Complete 50 workouts", WorkoutCount, 50, 250, Rare),
        achievement("Centurion", "Complete 100 workouts", WorkoutCount, 100, 500, Epic),
        achievement("Point Collector", "Earn 100 points", TotalPoints, 100, 25, Common),
        achievement("Point Hoarder", "Earn 1000 points", TotalPoints, 1000, 100, Uncommon),
        achievement("Point Legend", "Earn 5000 points", TotalPoints, 5000, 300, Rare),
        achievement("Rising Hero", "Reach level 5", LevelReached, 5, 100, Uncommon),
        achievement("Seasoned Hero", "Reach level 20", LevelReached, 20, 500, Epic),
        achievement("Legendary Hero", "Reach level 50", LevelReached, 50, 1000, Legendary),
    ]
}
