use std::collections::{HashMap, HashSet};

use time::{Date, OffsetDateTime, UtcOffset};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    exercises::repo_types::Exercise,
    progression::services::{record_completion, ProgressOutcome},
    workouts::{
        dto::{UpdateWorkoutRequest, WorkoutEntryRequest},
        repo_types::{Workout, WorkoutEntry, WorkoutStatus},
        store::{WorkoutChanges, WorkoutStore},
    },
};

const MAX_NAME_LEN: usize = 100;

/// Σ(points × sets) over the entries, saturating.
pub fn total_points(entries: &[WorkoutEntry]) -> i64 {
    entries.iter().fold(0i64, |acc, e| {
        acc.saturating_add(e.points_reward.saturating_mul(i64::from(e.sets.max(0))))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionGate {
    /// Planned workout, first completion.
    Fresh,
    /// Completed on an earlier UTC date; it goes back to planned and runs again.
    Repeat,
}

/// Whether `workout` may be completed on the UTC date `today`.
pub fn completion_gate(workout: &Workout, today: Date) -> AppResult<CompletionGate> {
    match workout.status {
        WorkoutStatus::Planned => Ok(CompletionGate::Fresh),
        WorkoutStatus::Cancelled => Err(AppError::Conflict(
            "cancelled workouts cannot be completed".into(),
        )),
        WorkoutStatus::Completed => match workout.completed_at {
            Some(at) if utc_date(at) == today => Err(AppError::AlreadyCompletedToday),
            _ => Ok(CompletionGate::Repeat),
        },
    }
}

pub fn utc_date(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}

/// Completed workouts are history and stay as they are.
pub fn ensure_editable(workout: &Workout) -> AppResult<()> {
    if workout.status == WorkoutStatus::Completed {
        return Err(AppError::Conflict("completed workouts cannot be modified".into()));
    }
    Ok(())
}

/// Writes to someone else's workout are refused outright.
pub fn ensure_owner(workout: &Workout, user_id: Uuid) -> AppResult<()> {
    if workout.user_id != user_id {
        warn!(workout_id = %workout.id, %user_id, "write to foreign workout");
        return Err(AppError::Forbidden("workout belongs to another user".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> AppResult<()> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_entries(entries: &[WorkoutEntryRequest]) -> AppResult<()> {
    if entries.is_empty() {
        return Err(AppError::BadRequest("a workout needs at least one exercise".into()));
    }
    for e in entries {
        if e.sets < 1 || e.reps < 1 {
            return Err(AppError::BadRequest("sets and reps must be at least 1".into()));
        }
        if e.rest_seconds < 0 {
            return Err(AppError::BadRequest("rest_seconds must not be negative".into()));
        }
        if matches!(e.order_index, Some(i) if i < 0) {
            return Err(AppError::BadRequest("order_index must not be negative".into()));
        }
    }
    Ok(())
}

/// Every referenced exercise must exist and be active.
pub fn check_exercises(entries: &[WorkoutEntryRequest], found: &[Exercise]) -> AppResult<()> {
    let active: HashSet<Uuid> = found.iter().filter(|e| e.is_active).map(|e| e.id).collect();
    match entries.iter().find(|e| !active.contains(&e.exercise_id)) {
        Some(missing) => Err(AppError::BadRequest(format!(
            "exercise {} does not exist or is inactive",
            missing.exercise_id
        ))),
        None => Ok(()),
    }
}

pub fn group_entries(entries: Vec<WorkoutEntry>) -> HashMap<Uuid, Vec<WorkoutEntry>> {
    let mut grouped: HashMap<Uuid, Vec<WorkoutEntry>> = HashMap::new();
    for e in entries {
        grouped.entry(e.workout_id).or_default().push(e);
    }
    grouped
}

#[derive(Debug)]
pub struct Completion {
    pub workout: Workout,
    pub entries: Vec<WorkoutEntry>,
    pub outcome: ProgressOutcome,
}

impl WorkoutChanges {
    /// Omitted request fields keep the stored value.
    pub fn merge(workout: &Workout, req: &UpdateWorkoutRequest) -> Self {
        Self {
            name: req
                .name
                .as_deref()
                .unwrap_or(&workout.name)
                .trim()
                .to_string(),
            description: req
                .description
                .clone()
                .or_else(|| workout.description.clone()),
            is_favorite: req.favorite.unwrap_or(workout.is_favorite),
        }
    }
}

/// Completes a workout and credits the owner in one unit of work.
///
/// Lock order is user row, then workout row.
pub async fn complete<S>(
    store: &mut S,
    user_id: Uuid,
    workout_id: Uuid,
    now: OffsetDateTime,
) -> AppResult<Completion>
where
    S: WorkoutStore + ?Sized,
{
    store.get_user(user_id).await?;
    let workout = store.lock_workout(workout_id).await?;
    ensure_owner(&workout, user_id)?;

    if completion_gate(&workout, utc_date(now))? == CompletionGate::Repeat {
        info!(%workout_id, "repeating a workout completed on an earlier day");
    }

    let entries = store.entries(workout_id).await?;
    let points = total_points(&entries);
    let workout = store.mark_completed(workout_id, points, now).await?;
    let outcome = record_completion(store, user_id, points, now).await?;

    info!(%workout_id, %user_id, points, "workout completed");
    let entries = entries
        .into_iter()
        .map(|e| WorkoutEntry {
            is_completed: true,
            ..e
        })
        .collect();
    Ok(Completion {
        workout,
        entries,
        outcome,
    })
}

/// Cancelling twice is a no-op.
pub async fn cancel<S>(
    store: &mut S,
    user_id: Uuid,
    workout_id: Uuid,
) -> AppResult<(Workout, Vec<WorkoutEntry>)>
where
    S: WorkoutStore + ?Sized,
{
    let workout = lock_for_write(store, user_id, workout_id).await?;
    let workout = if workout.status == WorkoutStatus::Cancelled {
        workout
    } else {
        let cancelled = store.set_status(workout_id, WorkoutStatus::Cancelled).await?;
        info!(%workout_id, "workout cancelled");
        cancelled
    };
    let entries = store.entries(workout_id).await?;
    Ok((workout, entries))
}

/// Entry requests must already be validated against the catalog.
pub async fn update<S>(
    store: &mut S,
    user_id: Uuid,
    workout_id: Uuid,
    req: &UpdateWorkoutRequest,
) -> AppResult<(Workout, Vec<WorkoutEntry>)>
where
    S: WorkoutStore + ?Sized,
{
    let workout = lock_for_write(store, user_id, workout_id).await?;
    let changes = WorkoutChanges::merge(&workout, req);
    validate_name(&changes.name)?;

    let updated = store.update_details(workout_id, &changes).await?;
    if let Some(entries) = &req.exercises {
        store.replace_entries(workout_id, entries).await?;
    }
    let entries = store.entries(workout_id).await?;
    info!(%workout_id, "workout updated");
    Ok((updated, entries))
}

pub async fn delete<S>(store: &mut S, user_id: Uuid, workout_id: Uuid) -> AppResult<()>
where
    S: WorkoutStore + ?Sized,
{
    lock_for_write(store, user_id, workout_id).await?;
    store.delete_workout(workout_id).await?;
    info!(%workout_id, "workout deleted");
    Ok(())
}

async fn lock_for_write<S>(store: &mut S, user_id: Uuid, workout_id: Uuid) -> AppResult<Workout>
where
    S: WorkoutStore + ?Sized,
{
    let workout = store.lock_workout(workout_id).await?;
    ensure_owner(&workout, user_id)?;
    ensure_editable(&workout)?;
    Ok(workout)
}

#[cfg(test)]
mod tests {
    use time::{macros::datetime, Duration};

    use super::*;
    use crate::{
        achievements::repo_types::{Achievement, AchievementKind},
        exercises::repo_types::{Category, Difficulty},
        progression::store::fixtures::{achievement, user, MemoryStore},
        workouts::store::fixtures::{entry_request, exercise as catalog_exercise},
    };

    fn entry(points: i64, sets: i32) -> WorkoutEntry {
        WorkoutEntry {
            id: Uuid::new_v4(),
            workout_id: Uuid::nil(),
            exercise_id: Uuid::new_v4(),
            exercise_name: "Squats".into(),
            category: Category::Strength,
            points_reward: points,
            sets,
            reps: 10,
            rest_seconds: 60,
            order_index: 0,
            notes: None,
            is_completed: false,
        }
    }

    fn workout(status: WorkoutStatus, completed_at: Option<OffsetDateTime>) -> Workout {
        let now = OffsetDateTime::now_utc();
        Workout {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Leg day".into(),
            description: None,
            status,
            total_points: 0,
            completed_at,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(exercise_id: Uuid) -> WorkoutEntryRequest {
        serde_json::from_value(serde_json::json!({ "exercise_id": exercise_id })).unwrap()
    }

    #[test]
    fn total_is_points_times_sets() {
        assert_eq!(total_points(&[entry(10, 3), entry(15, 2)]), 60);
        assert_eq!(total_points(&[]), 0);
        assert_eq!(total_points(&[entry(0, 5)]), 0);
    }

    #[test]
    fn total_saturates() {
        assert_eq!(total_points(&[entry(i64::MAX, 2), entry(1, 1)]), i64::MAX);
    }

    #[test]
    fn planned_workouts_complete_fresh() {
        let w = workout(WorkoutStatus::Planned, None);
        let today = datetime!(2024-03-10 12:00 UTC).date();
        assert_eq!(completion_gate(&w, today).unwrap(), CompletionGate::Fresh);
    }

    #[test]
    fn completed_today_is_rejected() {
        let at = datetime!(2024-03-10 00:05 UTC);
        let w = workout(WorkoutStatus::Completed, Some(at));
        let err = completion_gate(&w, at.date()).unwrap_err();
        assert!(matches!(err, AppError::AlreadyCompletedToday));
    }

    #[test]
    fn completed_yesterday_repeats() {
        let at = datetime!(2024-03-09 23:59 UTC);
        let w = workout(WorkoutStatus::Completed, Some(at));
        let today = (at + Duration::minutes(2)).date();
        assert_eq!(completion_gate(&w, today).unwrap(), CompletionGate::Repeat);
    }

    #[test]
    fn throttle_uses_the_utc_date() {
        // 23:30 at UTC-5 is already the next day in UTC.
        let at = datetime!(2024-03-09 23:30 -5);
        let w = workout(WorkoutStatus::Completed, Some(at));
        assert!(completion_gate(&w, datetime!(2024-03-10 06:00 UTC).date()).is_err());
        assert!(completion_gate(&w, datetime!(2024-03-11 00:00 UTC).date()).is_ok());
    }

    #[test]
    fn cancelled_cannot_complete() {
        let w = workout(WorkoutStatus::Cancelled, None);
        let err = completion_gate(&w, OffsetDateTime::now_utc().date()).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn completed_workouts_are_read_only() {
        assert!(ensure_editable(&workout(WorkoutStatus::Planned, None)).is_ok());
        assert!(ensure_editable(&workout(WorkoutStatus::Cancelled, None)).is_ok());
        let done = workout(WorkoutStatus::Completed, Some(OffsetDateTime::now_utc()));
        assert!(matches!(ensure_editable(&done), Err(AppError::Conflict(_))));
    }

    #[test]
    fn foreign_writes_are_forbidden() {
        let w = workout(WorkoutStatus::Planned, None);
        assert!(ensure_owner(&w, w.user_id).is_ok());
        assert!(matches!(
            ensure_owner(&w, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn entry_requests_get_defaults_and_are_validated() {
        let mut req = request(Uuid::new_v4());
        assert_eq!((req.sets, req.reps, req.rest_seconds), (3, 10, 60));
        assert!(validate_entries(&[req.clone()]).is_ok());
        assert!(validate_entries(&[]).is_err());

        req.sets = 0;
        assert!(validate_entries(&[req.clone()]).is_err());
        req.sets = 1;
        req.rest_seconds = -1;
        assert!(validate_entries(&[req]).is_err());
    }

    #[test]
    fn unknown_or_inactive_exercises_are_rejected() {
        let now = OffsetDateTime::now_utc();
        let exercise = |active: bool| Exercise {
            id: Uuid::new_v4(),
            name: "Plank".into(),
            description: None,
            points_reward: 10,
            difficulty: Difficulty::Easy,
            category: Category::Strength,
            estimated_duration_minutes: None,
            is_active: active,
            created_at: now,
            updated_at: now,
        };
        let live = exercise(true);
        let retired = exercise(false);
        let found = vec![live.clone(), retired.clone()];

        assert!(check_exercises(&[request(live.id)], &found).is_ok());
        assert!(check_exercises(&[request(retired.id)], &found).is_err());
        assert!(check_exercises(&[request(Uuid::new_v4())], &found).is_err());
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert!(validate_name("Leg day").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn entries_group_by_workout() {
        let a = Uuid::new_v4();
        let mut first = entry(10, 1);
        first.workout_id = a;
        let mut second = entry(20, 1);
        second.workout_id = a;
        let other = entry(5, 1);

        let grouped = group_entries(vec![first, second, other]);
        assert_eq!(grouped[&a].len(), 2);
        assert_eq!(grouped[&Uuid::nil()].len(), 1);
    }

    /// Store holding one user and a planned 50-point workout (10 points x 5 sets).
    fn planned(catalog: Vec<Achievement>) -> (MemoryStore, Uuid, Uuid) {
        let hero = user("hero");
        let squats = catalog_exercise("Squats", 10);
        let mut store = MemoryStore::with(hero.clone(), catalog);
        let workout_id = store.plan_workout(hero.id, &[(&squats, 5)]);
        (store, hero.id, workout_id)
    }

    fn no_changes() -> UpdateWorkoutRequest {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }

    #[tokio::test]
    async fn completion_is_throttled_per_day_and_pays_again_later() {
        let (mut store, hero, workout_id) = planned(vec![]);
        let monday = datetime!(2024-03-11 08:00 UTC);

        let first = complete(&mut store, hero, workout_id, monday).await.unwrap();
        assert_eq!(first.workout.status, WorkoutStatus::Completed);
        assert_eq!(first.workout.total_points, 50);
        assert!(first.entries.iter().all(|e| e.is_completed));
        assert_eq!(first.outcome.points_awarded, 50);
        assert_eq!(store.users[&hero].total_points, 50);

        let again = complete(&mut store, hero, workout_id, monday + Duration::hours(10)).await;
        assert!(matches!(again, Err(AppError::AlreadyCompletedToday)));
        assert_eq!(store.users[&hero].total_points, 50);
        assert_eq!(store.users[&hero].workouts_completed, 1);

        let tuesday = complete(&mut store, hero, workout_id, monday + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(tuesday.outcome.points_awarded, 50);
        assert_eq!(tuesday.outcome.user.total_points, 100);
        assert_eq!(tuesday.outcome.user.workouts_completed, 2);
        assert_eq!(store.workouts[&workout_id].completed_at, Some(monday + Duration::days(1)));
    }

    #[tokio::test]
    async fn first_completion_pays_workout_and_first_win() {
        let first_win = achievement("First Win", AchievementKind::WorkoutCount, Some(1), 50);
        let (mut store, hero, workout_id) = planned(vec![first_win]);

        let done = complete(&mut store, hero, workout_id, OffsetDateTime::now_utc())
            .await
            .unwrap();
        assert_eq!(done.outcome.user.total_points, 100);
        assert_eq!(done.outcome.user.workouts_completed, 1);
        assert_eq!(done.outcome.unlocked.len(), 1);
        assert_eq!(store.unlocks_for(hero), 1);
    }

    #[tokio::test]
    async fn completed_workouts_refuse_cancel_edit_and_delete() {
        let (mut store, hero, workout_id) = planned(vec![]);
        let before_entries = store.entries[&workout_id].clone();
        complete(&mut store, hero, workout_id, OffsetDateTime::now_utc())
            .await
            .unwrap();

        let cancelled = cancel(&mut store, hero, workout_id).await;
        assert!(matches!(cancelled, Err(AppError::Conflict(_))));

        let mut edit = no_changes();
        edit.name = Some("Renamed".into());
        edit.exercises = Some(vec![entry_request(before_entries[0].exercise_id, 1)]);
        let edited = update(&mut store, hero, workout_id, &edit).await;
        assert!(matches!(edited, Err(AppError::Conflict(_))));

        let deleted = delete(&mut store, hero, workout_id).await;
        assert!(matches!(deleted, Err(AppError::Conflict(_))));

        let stored = &store.workouts[&workout_id];
        assert_eq!(stored.status, WorkoutStatus::Completed);
        assert_eq!(stored.name, "Leg day");
        assert_eq!(store.entries[&workout_id].len(), before_entries.len());
        assert_eq!(store.entries[&workout_id][0].sets, 5);
        assert_eq!(store.users[&hero].total_points, 50);
    }

    #[tokio::test]
    async fn cancelled_workouts_cannot_be_completed() {
        let (mut store, hero, workout_id) = planned(vec![]);

        let (workout, _) = cancel(&mut store, hero, workout_id).await.unwrap();
        assert_eq!(workout.status, WorkoutStatus::Cancelled);
        let (again, _) = cancel(&mut store, hero, workout_id).await.unwrap();
        assert_eq!(again.status, WorkoutStatus::Cancelled);

        let err = complete(&mut store, hero, workout_id, OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.users[&hero].total_points, 0);
        assert_eq!(store.saves, 0);
    }

    #[tokio::test]
    async fn other_users_cannot_touch_the_workout() {
        let (mut store, _, workout_id) = planned(vec![]);
        let stranger = user("stranger");
        store.users.insert(stranger.id, stranger.clone());

        let err = complete(&mut store, stranger.id, workout_id, OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(matches!(
            cancel(&mut store, stranger.id, workout_id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            delete(&mut store, stranger.id, workout_id).await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(store.workouts[&workout_id].status, WorkoutStatus::Planned);
    }

    #[tokio::test]
    async fn update_keeps_omitted_fields_and_replaces_entries() {
        let (mut store, hero, workout_id) = planned(vec![]);
        let plank = catalog_exercise("Plank", 15);
        store.exercises.insert(plank.id, plank.clone());

        let mut req = no_changes();
        req.favorite = Some(true);
        req.exercises = Some(vec![entry_request(plank.id, 2)]);
        let (workout, entries) = update(&mut store, hero, workout_id, &req).await.unwrap();

        assert_eq!(workout.name, "Leg day");
        assert!(workout.is_favorite);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].exercise_name, "Plank");
        assert_eq!(total_points(&entries), 30);

        let (unchanged, _) = update(&mut store, hero, workout_id, &no_changes()).await.unwrap();
        assert!(unchanged.is_favorite);
    }

    #[tokio::test]
    async fn planned_workouts_can_be_deleted() {
        let (mut store, hero, workout_id) = planned(vec![]);
        delete(&mut store, hero, workout_id).await.unwrap();
        assert!(!store.workouts.contains_key(&workout_id));
        assert!(!store.entries.contains_key(&workout_id));

        let missing = cancel(&mut store, hero, workout_id).await;
        assert!(matches!(missing, Err(AppError::NotFound("workout"))));
    }

    #[test]
    fn favorite_request_sets_an_explicit_value() {
        let req: crate::workouts::dto::FavoriteRequest =
            serde_json::from_value(serde_json::json!({ "favorite": false })).unwrap();
        assert!(!req.favorite);
        assert!(serde_json::from_value::<crate::workouts::dto::FavoriteRequest>(
            serde_json::json!({})
        )
        .is_err());
    }

    #[test]
    fn merge_fills_omitted_fields_from_the_stored_workout() {
        let mut stored = workout(WorkoutStatus::Planned, None);
        stored.description = Some("quads".into());
        stored.is_favorite = true;

        let mut req = no_changes();
        req.name = Some("  Push day ".into());
        let changes = WorkoutChanges::merge(&stored, &req);
        assert_eq!(
            changes,
            WorkoutChanges {
                name: "Push day".into(),
                description: Some("quads".into()),
                is_favorite: true,
            }
        );

        req.favorite = Some(false);
        assert!(!WorkoutChanges::merge(&stored, &req).is_favorite);
    }
}
