use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    auth::Principal,
    error::{is_unique_violation, AppError, AppResult},
    progression::leveling::Badge,
    users::{
        dto::LeaderboardEntry,
        repo_types::{LeaderboardRow, User},
    },
};

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Local record for the caller, created on first sight of the subject.
pub async fn current_user(db: &PgPool, principal: &Principal) -> AppResult<User> {
    let user = match User::find(db, principal.id).await? {
        Some(user) => user,
        None => {
            let user = User::provision(db, &principal.to_new_user())
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        warn!(user_id = %principal.id, username = %principal.username, "identity clashes with an existing user");
                        AppError::Conflict("username or email already taken".into())
                    } else {
                        AppError::Database(e)
                    }
                })?;
            info!(user_id = %user.id, username = %user.username, "user provisioned");
            user
        }
    };

    if !user.is_active {
        return Err(AppError::Forbidden("account is disabled".into()));
    }
    Ok(user)
}

pub fn clamp_leaderboard_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_PAGE_SIZE)
}

/// `(limit, offset)` for a zero-based page.
pub fn page_bounds(page: i64, size: i64) -> (i64, i64) {
    let size = size.clamp(1, MAX_PAGE_SIZE);
    let page = page.max(0);
    (size, page.saturating_mul(size))
}

pub fn rank(rows: Vec<LeaderboardRow>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i + 1,
            badge: Badge::for_level(row.current_level),
            username: row.username,
            total_points: row.total_points,
            current_level: row.current_level,
            workouts_completed: row.workouts_completed,
            achievements_count: row.achievements_count,
        })
        .collect()
}
