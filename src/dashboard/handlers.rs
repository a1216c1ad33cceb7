use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::AuthUser,
    dashboard::{dto::DashboardDto, services},
    error::AppResult,
    state::AppState,
    users::{dto::UserDto, services::current_user},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/profile", get(profile))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<DashboardDto>> {
    let user = current_user(&state.db, &principal).await?;
    Ok(Json(services::build(&state, &user, OffsetDateTime::now_utc()).await?))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> AppResult<Json<UserDto>> {
    let user = current_user(&state.db, &principal).await?;
    Ok(Json(UserDto::from(&user)))
}
