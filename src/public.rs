use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/public/health", get(health))
        .route("/public/welcome", get(welcome))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME") }))
}

/// Sign-in happens at the identity provider, so this points at the API itself.
pub async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to HeroTraining",
        "data": {
            "version": env!("CARGO_PKG_VERSION"),
            "health": "/api/public/health",
            "exercises": "/api/exercises",
            "workouts": "/api/workouts",
            "achievements": "/api/achievements",
            "dashboard": "/api/dashboard",
        }
    }))
}
