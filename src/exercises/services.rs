use crate::{
    error::{AppError, AppResult},
    exercises::dto::ExerciseRequest,
};

const MAX_NAME_LEN: usize = 100;

pub fn validate(req: &ExerciseRequest) -> AppResult<()> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    if req.points_reward < 0 {
        return Err(AppError::BadRequest("points_reward must not be negative".into()));
    }
    if matches!(req.estimated_duration_minutes, Some(m) if m <= 0) {
        return Err(AppError::BadRequest(
            "estimated_duration_minutes must be positive".into(),
        ));
    }
    Ok(())
}
