use crate::{
    achievements::dto::AchievementRequest,
    error::{AppError, AppResult},
};

const MAX_NAME_LEN: usize = 100;

/// Rejects catalog entries the evaluator could never use.
pub fn validate(req: &AchievementRequest) -> AppResult<()> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    if req.points_reward < 0 {
        return Err(AppError::BadRequest("points_reward must not be negative".into()));
    }
    match req.required_value {
        Some(v) if v < 1 => Err(AppError::BadRequest("required_value must be positive".into())),
        None if req.kind.is_automatic() => Err(AppError::BadRequest(format!(
            "required_value is mandatory for {:?}",
            req.kind
        ))),
        _ => Ok(()),
    }
}
