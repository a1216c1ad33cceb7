use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    achievements::{
        dto::{AchievementDto, UnlockedAchievementDto},
        repo_types::Achievement,
    },
    admin::dto::GrantDto,
    auth::AdminUser,
    error::{AppError, AppResult},
    exercises::{dto::ExerciseDto, repo_types::Exercise},
    progression::{pg::PgProgressStore, services::grant_and_evaluate},
    state::AppState,
    users::{
        dto::{LeaderboardEntry, LeaderboardQuery, Page, PageQuery, UserDetails, UserDto},
        repo_types::User,
        services::{clamp_leaderboard_limit, page_bounds, rank},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/leaderboard", get(leaderboard))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", get(get_user))
        .route(
            "/admin/users/:id/achievements/:achievement_id",
            post(grant),
        )
        .route("/admin/exercises", get(all_exercises))
        .route("/admin/achievements", get(all_achievements))
}

#[instrument(skip(state, _admin))]
pub async fn leaderboard(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(q): Query<LeaderboardQuery>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
    let rows = User::leaderboard(&state.db, clamp_leaderboard_limit(q.limit)).await?;
    Ok(Json(rank(rows)))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(q): Query<PageQuery>,
) -> AppResult<Json<Page<UserDto>>> {
    let (limit, offset) = page_bounds(q.page, q.size);
    let users = User::list(&state.db, limit, offset).await?;
    let total = User::count(&state.db).await?;
    Ok(Json(Page {
        items: users.iter().map(UserDto::from).collect(),
        page: q.page.max(0),
        size: limit,
        total,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserDetails>> {
    let user = User::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    let achievements_count = User::achievements_count(&state.db, id).await?;
    Ok(Json(UserDetails {
        user: UserDto::from(&user),
        achievements_count,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn all_exercises(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<ExerciseDto>>> {
    let items = Exercise::list_all(&state.db).await?;
    Ok(Json(items.iter().map(ExerciseDto::from).collect()))
}

#[instrument(skip(state, _admin))]
pub async fn all_achievements(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<AchievementDto>>> {
    let items = Achievement::list_all(&state.db).await?;
    Ok(Json(items.iter().map(AchievementDto::from).collect()))
}

/// Unlocks an achievement by hand, paying its reward once.
#[instrument(skip(state, admin), fields(by = %admin.username))]
pub async fn grant(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path((user_id, achievement_id)): Path<(Uuid, Uuid)>,
) -> AppResult<(StatusCode, Json<GrantDto>)> {
    let mut tx = state.db.begin().await?;
    let outcome = {
        let mut store = PgProgressStore::new(&mut *tx);
        grant_and_evaluate(&mut store, user_id, achievement_id, OffsetDateTime::now_utc()).await?
    };
    tx.commit().await?;

    info!(
        %user_id,
        %achievement_id,
        by = %admin.username,
        unlocked = outcome.unlocked.len(),
        "achievement granted by admin"
    );
    Ok((
        StatusCode::CREATED,
        Json(GrantDto {
            user: UserDto::from(&outcome.user),
            points_awarded: outcome.points_awarded,
            unlocked: outcome.unlocked.iter().map(UnlockedAchievementDto::from).collect(),
        }),
    ))
}
