use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    exercises::{
        dto::{ExerciseDto, ExerciseRequest},
        repo_types::{Category, Exercise},
        services::validate,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exercises", get(list_active).post(create))
        .route("/exercises/category/:category", get(list_by_category))
        .route(
            "/exercises/:id",
            get(get_exercise).put(update).delete(deactivate),
        )
}

#[instrument(skip(state, _user))]
pub async fn list_active(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<ExerciseDto>>> {
    let items = Exercise::list_active(&state.db).await?;
    Ok(Json(items.iter().map(ExerciseDto::from).collect()))
}

#[instrument(skip(state, _user))]
pub async fn list_by_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<ExerciseDto>>> {
    let category: Category = category.parse().map_err(AppError::BadRequest)?;
    let items = Exercise::list_by_category(&state.db, category).await?;
    Ok(Json(items.iter().map(ExerciseDto::from).collect()))
}

#[instrument(skip(state, principal))]
pub async fn get_exercise(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ExerciseDto>> {
    match Exercise::find(&state.db, id).await? {
        Some(e) if e.is_active || principal.is_admin => Ok(Json(ExerciseDto::from(&e))),
        _ => Err(AppError::NotFound("exercise")),
    }
}

#[instrument(skip(state, admin, req), fields(admin = %admin.username))]
pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<ExerciseRequest>,
) -> AppResult<(StatusCode, Json<ExerciseDto>)> {
    if let Err(e) = validate(&req) {
        warn!(error = %e, "rejected exercise");
        return Err(e);
    }
    let created = Exercise::create(&state.db, &req)
        .await
        .map_err(|e| AppError::on_unique(e, "exercise name already exists"))?;
    info!(exercise_id = %created.id, name = %created.name, "exercise created");
    Ok((StatusCode::CREATED, Json(ExerciseDto::from(&created))))
}

#[instrument(skip(state, admin, req), fields(admin = %admin.username))]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ExerciseRequest>,
) -> AppResult<Json<ExerciseDto>> {
    validate(&req)?;
    let updated = Exercise::update(&state.db, id, &req)
        .await
        .map_err(|e| AppError::on_unique(e, "exercise name already exists"))?
        .ok_or(AppError::NotFound("exercise"))?;
    info!(exercise_id = %id, "exercise updated");
    Ok(Json(ExerciseDto::from(&updated)))
}

#[instrument(skip(state, admin), fields(admin = %admin.username))]
pub async fn deactivate(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !Exercise::deactivate(&state.db, id).await? {
        return Err(AppError::NotFound("exercise"));
    }
    info!(exercise_id = %id, "exercise deactivated");
    Ok(StatusCode::NO_CONTENT)
}
