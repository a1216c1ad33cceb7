use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    achievements::{
        dto::{AchievementDto, AchievementRequest, UnlockedAchievementDto},
        repo_types::{Achievement, UnlockRecord},
        services::validate,
    },
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    state::AppState,
    users::services::current_user,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/achievements", get(list_active).post(create))
        .route("/achievements/my", get(my_achievements))
        .route(
            "/achievements/:id",
            get(get_achievement).put(update).delete(deactivate),
        )
}

#[instrument(skip(state, _user))]
pub async fn list_active(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<AchievementDto>>> {
    let items = Achievement::list_active(&state.db).await?;
    Ok(Json(items.iter().map(AchievementDto::from).collect()))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn my_achievements(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<Vec<UnlockedAchievementDto>>> {
    let user = current_user(&state.db, &principal).await?;
    let rows = UnlockRecord::list_for_user(&state.db, user.id, None).await?;
    Ok(Json(rows.iter().map(UnlockedAchievementDto::from).collect()))
}

#[instrument(skip(state, principal))]
pub async fn get_achievement(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AchievementDto>> {
    match Achievement::find(&state.db, id).await? {
        Some(a) if a.is_active || principal.is_admin => Ok(Json(AchievementDto::from(&a))),
        _ => Err(AppError::NotFound("achievement")),
    }
}

#[instrument(skip(state, admin, req), fields(admin = %admin.username))]
pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<AchievementRequest>,
) -> AppResult<(StatusCode, Json<AchievementDto>)> {
    if let Err(e) = validate(&req) {
        warn!(error = %e, "rejected achievement");
        return Err(e);
    }
    let created = Achievement::create(&state.db, &req)
        .await
        .map_err(|e| AppError::on_unique(e, "achievement name already exists"))?;
    info!(achievement_id = %created.id, name = %created.name, "achievement created");
    Ok((StatusCode::CREATED, Json(AchievementDto::from(&created))))
}

#[instrument(skip(state, admin, req), fields(admin = %admin.username))]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AchievementRequest>,
) -> AppResult<Json<AchievementDto>> {
    validate(&req)?;
    let updated = Achievement::update(&state.db, id, &req)
        .await
        .map_err(|e| AppError::on_unique(e, "achievement name already exists"))?
        .ok_or(AppError::NotFound("achievement"))?;
    info!(achievement_id = %id, "achievement updated");
    Ok(Json(AchievementDto::from(&updated)))
}

#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn deactivate(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !Achievement::deactivate(&state.db, id).await? {
        return Err(AppError::NotFound("achievement"));
    }
    info!(achievement_id = %id, "achievement deactivated");
    Ok(StatusCode::NO_CONTENT)
}
