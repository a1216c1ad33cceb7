use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    achievements::dto::UnlockedAchievementDto,
    auth::{AuthUser, Principal},
    error::{AppError, AppResult},
    exercises::repo_types::Exercise,
    progression::pg::PgProgressStore,
    state::AppState,
    users::{dto::UserDto, services::current_user},
    workouts::{
        dto::{
            CompletionDto, CreateWorkoutRequest, FavoriteRequest, UpdateWorkoutRequest,
            WorkoutDto,
        },
        repo_types::{Workout, WorkoutEntry, WorkoutFilter},
        services::{
            self, check_exercises, ensure_owner, group_entries, validate_entries, validate_name,
        },
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_all).post(create))
        .route("/workouts/favorites", get(list_favorites))
        .route("/workouts/completed", get(list_completed))
        .route(
            "/workouts/:id",
            get(get_workout).put(update).delete(delete_workout),
        )
        .route("/workouts/:id/complete", post(complete))
        .route("/workouts/:id/cancel", post(cancel))
        .route("/workouts/:id/favorite", post(set_favorite))
}

/// Workouts with their entries, in the order given.
pub async fn with_entries(state: &AppState, workouts: Vec<Workout>) -> AppResult<Vec<WorkoutDto>> {
    let ids: Vec<Uuid> = workouts.iter().map(|w| w.id).collect();
    let mut grouped = group_entries(WorkoutEntry::list_for_workouts(&state.db, &ids).await?);
    Ok(workouts
        .iter()
        .map(|w| WorkoutDto::new(w, &grouped.remove(&w.id).unwrap_or_default()))
        .collect())
}

async fn list(
    state: &AppState,
    principal: &Principal,
    filter: WorkoutFilter,
) -> AppResult<Json<Vec<WorkoutDto>>> {
    let user = current_user(&state.db, principal).await?;
    let workouts = Workout::list_for_user(&state.db, user.id, filter, None).await?;
    Ok(Json(with_entries(state, workouts).await?))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn list_all(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<Vec<WorkoutDto>>> {
    list(&state, &principal, WorkoutFilter::All).await
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<Vec<WorkoutDto>>> {
    list(&state, &principal, WorkoutFilter::Favorites).await
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn list_completed(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<Vec<WorkoutDto>>> {
    list(&state, &principal, WorkoutFilter::Completed).await
}

/// Other users' workouts read as missing.
#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn get_workout(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkoutDto>> {
    let user = current_user(&state.db, &principal).await?;
    let workout = Workout::find(&state.db, id)
        .await?
        .filter(|w| w.user_id == user.id)
        .ok_or(AppError::NotFound("workout"))?;
    let entries = WorkoutEntry::list(&state.db, id).await?;
    Ok(Json(WorkoutDto::new(&workout, &entries)))
}

#[instrument(skip(state, principal, req), fields(user_id = %principal.id))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(req): Json<CreateWorkoutRequest>,
) -> AppResult<(StatusCode, Json<WorkoutDto>)> {
    let user = current_user(&state.db, &principal).await?;
    validate_name(&req.name)?;
    validate_entries(&req.exercises)?;
    let ids: Vec<Uuid> = req.exercises.iter().map(|e| e.exercise_id).collect();
    check_exercises(&req.exercises, &Exercise::find_many(&state.db, &ids).await?)?;

    let mut tx = state.db.begin().await?;
    let workout = Workout::insert(
        &mut *tx,
        user.id,
        req.name.trim(),
        req.description.as_deref(),
    )
    .await?;
    WorkoutEntry::insert_all(&mut *tx, workout.id, &req.exercises).await?;
    let entries = WorkoutEntry::list(&mut *tx, workout.id).await?;
    tx.commit().await?;

    info!(workout_id = %workout.id, exercises = entries.len(), "workout created");
    Ok((StatusCode::CREATED, Json(WorkoutDto::new(&workout, &entries))))
}

#[instrument(skip(state, principal, req), fields(user_id = %principal.id))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWorkoutRequest>,
) -> AppResult<Json<WorkoutDto>> {
    let user = current_user(&state.db, &principal).await?;
    if let Some(name) = &req.name {
        validate_name(name)?;
    }
    if let Some(entries) = &req.exercises {
        validate_entries(entries)?;
        let ids: Vec<Uuid> = entries.iter().map(|e| e.exercise_id).collect();
        check_exercises(entries, &Exercise::find_many(&state.db, &ids).await?)?;
    }

    let mut tx = state.db.begin().await?;
    let (workout, entries) = {
        let mut store = PgProgressStore::new(&mut *tx);
        services::update(&mut store, user.id, id, &req).await?
    };
    tx.commit().await?;
    Ok(Json(WorkoutDto::new(&workout, &entries)))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn complete(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CompletionDto>> {
    let user = current_user(&state.db, &principal).await?;

    let mut tx = state.db.begin().await?;
    let done = {
        let mut store = PgProgressStore::new(&mut *tx);
        services::complete(&mut store, user.id, id, OffsetDateTime::now_utc()).await?
    };
    tx.commit().await?;

    Ok(Json(CompletionDto {
        workout: WorkoutDto::new(&done.workout, &done.entries),
        user: UserDto::from(&done.outcome.user),
        points_awarded: done.outcome.points_awarded,
        unlocked: done
            .outcome
            .unlocked
            .iter()
            .map(UnlockedAchievementDto::from)
            .collect(),
    }))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn cancel(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkoutDto>> {
    let user = current_user(&state.db, &principal).await?;

    let mut tx = state.db.begin().await?;
    let (workout, entries) = {
        let mut store = PgProgressStore::new(&mut *tx);
        services::cancel(&mut store, user.id, id).await?
    };
    tx.commit().await?;
    Ok(Json(WorkoutDto::new(&workout, &entries)))
}

/// Favorites can be set on workouts in any status.
#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn set_favorite(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<Json<WorkoutDto>> {
    let user = current_user(&state.db, &principal).await?;
    let workout = Workout::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("workout"))?;
    ensure_owner(&workout, user.id)?;

    let workout = Workout::set_favorite(&state.db, id, req.favorite).await?;
    let entries = WorkoutEntry::list(&state.db, id).await?;
    Ok(Json(WorkoutDto::new(&workout, &entries)))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn delete_workout(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let user = current_user(&state.db, &principal).await?;

    let mut tx = state.db.begin().await?;
    services::delete(&mut PgProgressStore::new(&mut *tx), user.id, id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
