use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    rules::{self, ProgressSnapshot, Rule},
    store::ProgressStore,
};
use crate::{
    achievements::repo_types::{Achievement, AchievementKind, UnlockRecord},
    error::{AppError, AppResult},
    users::repo_types::User,
};

/// An unlock created during a pass, with the catalog entry it pays out.
#[derive(Debug, Clone)]
pub struct Unlocked {
    pub achievement: Achievement,
    pub record: UnlockRecord,
}

/// Result of one read-modify-write pass over a user's progression.
#[derive(Debug, Clone)]
pub struct ProgressOutcome {
    pub user: User,
    pub unlocked: Vec<Unlocked>,
    pub points_awarded: i64,
}

/// Credits a completed workout: points, workout counter, then achievements.
pub async fn record_completion<S>(
    store: &mut S,
    user_id: Uuid,
    workout_points: i64,
    now: OffsetDateTime,
) -> AppResult<ProgressOutcome>
where
    S: ProgressStore + ?Sized,
{
    let mut user = store.get_user(user_id).await?;
    let before = user.total_points;

    user.set_stats(user.stats().complete_workout(workout_points));
    user.last_workout_at = Some(now);

    let unlocked = unlock_satisfied(store, &mut user, now).await?;
    user.updated_at = now;
    store.save_user(&user).await?;

    info!(
        %user_id,
        workout_points,
        level = user.current_level,
        badge = %user.stats().badge(),
        unlocked = unlocked.len(),
        "workout credited"
    );
    Ok(ProgressOutcome {
        points_awarded: user.total_points - before,
        user,
        unlocked,
    })
}

/// Runs the evaluator for a user without any other stat change.
pub async fn evaluate_and_unlock<S>(
    store: &mut S,
    user_id: Uuid,
    now: OffsetDateTime,
) -> AppResult<ProgressOutcome>
where
    S: ProgressStore + ?Sized,
{
    let mut user = store.get_user(user_id).await?;
    let before = user.total_points;

    let unlocked = unlock_satisfied(store, &mut user, now).await?;
    if !unlocked.is_empty() {
        user.updated_at = now;
        store.save_user(&user).await?;
    }
    Ok(ProgressOutcome {
        points_awarded: user.total_points - before,
        user,
        unlocked,
    })
}

/// Unlocks an achievement by hand. Used for kinds the evaluator cannot check.
pub async fn grant_achievement<S>(
    store: &mut S,
    user_id: Uuid,
    achievement_id: Uuid,
    now: OffsetDateTime,
) -> AppResult<ProgressOutcome>
where
    S: ProgressStore + ?Sized,
{
    let mut user = store.get_user(user_id).await?;
    let achievement = store.get_achievement(achievement_id).await?;
    if store.unlock_exists(user_id, achievement_id).await? {
        return Err(AppError::AlreadyUnlocked {
            user_id,
            achievement_id,
        });
    }

    let record = store.create_unlock(user_id, achievement_id, now, None).await?;
    let before = user.total_points;
    user.set_stats(user.stats().add_points(achievement.points_reward));
    user.updated_at = now;
    store.save_user(&user).await?;

    info!(%user_id, achievement = %achievement.name, "achievement granted");
    Ok(ProgressOutcome {
        points_awarded: user.total_points - before,
        user,
        unlocked: vec![Unlocked {
            achievement,
            record,
        }],
    })
}

/// Manual grant followed by an evaluator pass, so a reward that crosses a
/// points or level threshold pays out in the same unit of work.
pub async fn grant_and_evaluate<S>(
    store: &mut S,
    user_id: Uuid,
    achievement_id: Uuid,
    now: OffsetDateTime,
) -> AppResult<ProgressOutcome>
where
    S: ProgressStore + ?Sized,
{
    let granted = grant_achievement(store, user_id, achievement_id, now).await?;
    let follow_up = evaluate_and_unlock(store, user_id, now).await?;

    let mut unlocked = granted.unlocked;
    unlocked.extend(follow_up.unlocked);
    Ok(ProgressOutcome {
        points_awarded: granted.points_awarded + follow_up.points_awarded,
        user: follow_up.user,
        unlocked,
    })
}

async fn unlock_satisfied<S>(
    store: &mut S,
    user: &mut User,
    now: OffsetDateTime,
) -> AppResult<Vec<Unlocked>>
where
    S: ProgressStore + ?Sized,
{
    let catalog = store.list_active_achievements().await?;
    let already_unlocked = store.unlocked_achievement_ids(user.id).await?;

    let needs_distinct = catalog
        .iter()
        .any(|a| a.kind == AchievementKind::CategoryMaster);
    let distinct_completed_exercises = if needs_distinct {
        store.count_distinct_completed_exercises(user.id).await?
    } else {
        0
    };
    let snapshot = ProgressSnapshot {
        stats: user.stats(),
        distinct_completed_exercises,
    };

    let mut stats = snapshot.stats;
    let mut unlocked = Vec::new();
    for achievement in rules::evaluate(&snapshot, &catalog, &already_unlocked) {
        let progress = Rule::of(achievement).progress_value(&snapshot);
        match store
            .create_unlock(user.id, achievement.id, now, progress)
            .await
        {
            Ok(record) => {
                stats = stats.add_points(achievement.points_reward);
                info!(
                    user_id = %user.id,
                    achievement = %achievement.name,
                    reward = achievement.points_reward,
                    "achievement unlocked"
                );
                unlocked.push(Unlocked {
                    achievement: achievement.clone(),
                    record,
                });
            }
            Err(AppError::AlreadyUnlocked { .. }) => {
                debug!(user_id = %user.id, achievement = %achievement.name, "already unlocked");
            }
            Err(e) => return Err(e),
        }
    }

    user.set_stats(stats);
    Ok(unlocked)
}
