use time::{Duration, OffsetDateTime};

use crate::{
    achievements::{dto::UnlockedAchievementDto, repo_types::UnlockRecord},
    dashboard::dto::{DashboardDto, DashboardStats},
    error::AppResult,
    state::AppState,
    users::{dto::UserDto, repo_types::User},
    workouts::{
        handlers::with_entries,
        repo_types::{Workout, WorkoutFilter},
    },
};

const RECENT_LIMIT: i64 = 5;

/// Counters that come straight from the user row.
pub fn base_stats(user: &User, achievements_unlocked: i64) -> DashboardStats {
    let stats = user.stats();
    DashboardStats {
        total_workouts: user.workouts_completed,
        total_points: user.total_points,
        current_level: user.current_level,
        badge: stats.badge(),
        points_for_next_level: stats.points_for_next_level(),
        achievements_unlocked,
        workouts_last_7_days: 0,
        workouts_last_30_days: 0,
        average_points_per_workout: 0.0,
    }
}

pub async fn build(state: &AppState, user: &User, now: OffsetDateTime) -> AppResult<DashboardDto> {
    let db = &state.db;
    let mut stats = base_stats(user, User::achievements_count(db, user.id).await?);
    stats.workouts_last_7_days =
        Workout::count_completed_since(db, user.id, now - Duration::days(7)).await?;
    stats.workouts_last_30_days =
        Workout::count_completed_since(db, user.id, now - Duration::days(30)).await?;
    stats.average_points_per_workout = Workout::average_completed_points(db, user.id).await?;

    let recent =
        Workout::list_for_user(db, user.id, WorkoutFilter::Completed, Some(RECENT_LIMIT)).await?;
    let favorites =
        Workout::list_for_user(db, user.id, WorkoutFilter::Favorites, Some(RECENT_LIMIT)).await?;
    let unlocks = UnlockRecord::list_for_user(db, user.id, Some(RECENT_LIMIT)).await?;

    Ok(DashboardDto {
        user: UserDto::from(user),
        stats,
        recent_workouts: with_entries(state, recent).await?,
        favorite_workouts: with_entries(state, favorites).await?,
        recent_achievements: unlocks.iter().map(UnlockedAchievementDto::from).collect(),
    })
}
