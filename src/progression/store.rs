use std::collections::HashSet;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    achievements::repo_types::{Achievement, UnlockRecord},
    error::AppResult,
    users::repo_types::User,
};

/// Persistence the progression flow reads and writes.
///
/// One instance covers one unit of work; implementations are expected to
/// serialize concurrent work for the same user (row lock or transaction).
#[async_trait]
pub trait ProgressStore: Send {
    async fn get_user(&mut self, user_id: Uuid) -> AppResult<User>;

    async fn save_user(&mut self, user: &User) -> AppResult<()>;

    async fn list_active_achievements(&mut self) -> AppResult<Vec<Achievement>>;

    async fn get_achievement(&mut self, achievement_id: Uuid) -> AppResult<Achievement>;

    async fn unlocked_achievement_ids(&mut self, user_id: Uuid) -> AppResult<HashSet<Uuid>>;

    async fn unlock_exists(&mut self, user_id: Uuid, achievement_id: Uuid) -> AppResult<bool>;

    /// Fails with `AppError::AlreadyUnlocked` when the pair already exists.
    async fn create_unlock(
        &mut self,
        user_id: Uuid,
        achievement_id: Uuid,
        unlocked_at: OffsetDateTime,
        progress_value: Option<i64>,
    ) -> AppResult<UnlockRecord>;

    async fn count_distinct_completed_exercises(&mut self, user_id: Uuid) -> AppResult<i64>;
}

#[cfg(test)]
pub mod fixtures {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        achievements::repo_types::{AchievementKind, AchievementRarity},
        error::AppError,
        exercises::repo_types::Exercise,
        workouts::repo_types::{Workout, WorkoutEntry},
    };

    pub fn achievement(
        name: &str,
        kind: AchievementKind,
        required_value: Option<i64>,
        points_reward: i64,
    ) -> Achievement {
        let now = OffsetDateTime::now_utc();
        Achievement {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            kind,
            icon_url: None,
            required_value,
            points_reward,
            rarity: AchievementRarity::Common,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn user(username: &str) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            total_points: 0,
            current_level: 1,
            workouts_completed: 0,
            is_active: true,
            last_workout_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// In-memory store with the same uniqueness guarantee as the database.
    #[derive(Default)]
    pub struct MemoryStore {
        pub users: HashMap<Uuid, User>,
        pub catalog: Vec<Achievement>,
        pub unlocks: Vec<UnlockRecord>,
        pub distinct_exercises: HashMap<Uuid, i64>,
        pub saves: usize,
        pub exercises: HashMap<Uuid, Exercise>,
        pub workouts: HashMap<Uuid, Workout>,
        pub entries: HashMap<Uuid, Vec<WorkoutEntry>>,
    }

    impl MemoryStore {
        pub fn with(user: User, catalog: Vec<Achievement>) -> Self {
            let mut store = Self {
                catalog,
                ..Self::default()
            };
            store.users.insert(user.id, user);
            store
        }

        pub fn unlocks_for(&self, user_id: Uuid) -> usize {
            self.unlocks.iter().filter(|u| u.user_id == user_id).count()
        }
    }

    #[async_trait]
    impl ProgressStore for MemoryStore {
        async fn get_user(&mut self, user_id: Uuid) -> AppResult<User> {
            self.users.get(&user_id).cloned().ok_or(AppError::NotFound("user"))
        }

        async fn save_user(&mut self, user: &User) -> AppResult<()> {
            self.saves += 1;
            self.users.insert(user.id, user.clone());
            Ok(())
        }

        async fn list_active_achievements(&mut self) -> AppResult<Vec<Achievement>> {
            Ok(self.catalog.iter().filter(|a| a.is_active).cloned().collect())
        }

        async fn get_achievement(&mut self, achievement_id: Uuid) -> AppResult<Achievement> {
            self.catalog
                .iter()
                .find(|a| a.id == achievement_id)
                .cloned()
                .ok_or(AppError::NotFound("achievement"))
        }

        async fn unlocked_achievement_ids(&mut self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
            Ok(self
                .unlocks
                .iter()
                .filter(|u| u.user_id == user_id)
                .map(|u| u.achievement_id)
                .collect())
        }

        async fn unlock_exists(&mut self, user_id: Uuid, achievement_id: Uuid) -> AppResult<bool> {
            Ok(self
                .unlocks
                .iter()
                .any(|u| u.user_id == user_id && u.achievement_id == achievement_id))
        }

        async fn create_unlock(
            &mut self,
            user_id: Uuid,
            achievement_id: Uuid,
            unlocked_at: OffsetDateTime,
            progress_value: Option<i64>,
        ) -> AppResult<UnlockRecord> {
            if self.unlock_exists(user_id, achievement_id).await? {
                return Err(AppError::AlreadyUnlocked {
                    user_id,
                    achievement_id,
                });
            }
            let record = UnlockRecord {
                id: Uuid::new_v4(),
                user_id,
                achievement_id,
                unlocked_at,
                progress_value,
            };
            self.unlocks.push(record.clone());
            Ok(record)
        }

        async fn count_distinct_completed_exercises(&mut self, user_id: Uuid) -> AppResult<i64> {
            Ok(self.distinct_exercises.get(&user_id).copied().unwrap_or(0))
        }
    }
}
