use sqlx::{PgConnection, PgExecutor, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::workouts::{
    dto::WorkoutEntryRequest,
    repo_types::{Workout, WorkoutEntry, WorkoutFilter, WorkoutStatus},
};

impl Workout {
    pub async fn find<'e, E>(db: E, id: Uuid) -> Result<Option<Workout>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workout>(
            r#"
            SELECT id, user_id, name, description, status, total_points, completed_at,
                   is_favorite, created_at, updated_at
            FROM workouts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_for_update<'e, E>(db: E, id: Uuid) -> Result<Option<Workout>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workout>(
            r#"
            SELECT id, user_id, name, description, status, total_points, completed_at,
                   is_favorite, created_at, updated_at
            FROM workouts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Newest first. `limit = None` returns everything.
    pub async fn list_for_user(
        db: &PgPool,
        user_id: Uuid,
        filter: WorkoutFilter,
        limit: Option<i64>,
    ) -> Result<Vec<Workout>, sqlx::Error> {
        let sql = match filter {
            WorkoutFilter::All => {
                r#"
                SELECT id, user_id, name, description, status, total_points, completed_at,
                       is_favorite, created_at, updated_at
                FROM workouts
                WHERE user_id = $1
                ORDER BY created_at DESC
                LIMIT $2
                "#
            }
            WorkoutFilter::Favorites => {
                r#"
                SELECT id, user_id, name, description, status, total_points, completed_at,
                       is_favorite, created_at, updated_at
                FROM workouts
                WHERE user_id = $1 AND is_favorite
                ORDER BY updated_at DESC
                LIMIT $2
                "#
            }
            WorkoutFilter::Completed => {
                r#"
                SELECT id, user_id, name, description, status, total_points, completed_at,
                       is_favorite, created_at, updated_at
                FROM workouts
                WHERE user_id = $1 AND status = 'COMPLETED'
                ORDER BY completed_at DESC
                LIMIT $2
                "#
            }
        };
        sqlx::query_as::<_, Workout>(sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(db)
            .await
    }

    pub async fn insert<'e, E>(
        db: E,
        user_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Workout, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workout>(
            r#"
            INSERT INTO workouts (user_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, description, status, total_points, completed_at,
                      is_favorite, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(description)
        .fetch_one(db)
        .await
    }

    pub async fn update_details<'e, E>(
        db: E,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        is_favorite: bool,
    ) -> Result<Workout, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workout>(
            r#"
            UPDATE workouts
            SET name = $2, description = $3, is_favorite = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, name, description, status, total_points, completed_at,
                      is_favorite, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(is_favorite)
        .fetch_one(db)
        .await
    }

    pub async fn mark_completed<'e, E>(
        db: E,
        id: Uuid,
        total_points: i64,
        completed_at: OffsetDateTime,
    ) -> Result<Workout, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workout>(
            r#"
            UPDATE workouts
            SET status = 'COMPLETED', total_points = $2, completed_at = $3, updated_at = $3
            WHERE id = $1
            RETURNING id, user_id, name, description, status, total_points, completed_at,
                      is_favorite, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(total_points)
        .bind(completed_at)
        .fetch_one(db)
        .await
    }

    pub async fn set_status<'e, E>(
        db: E,
        id: Uuid,
        status: WorkoutStatus,
    ) -> Result<Workout, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workout>(
            r#"
            UPDATE workouts
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, name, description, status, total_points, completed_at,
                      is_favorite, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(db)
        .await
    }

    pub async fn set_favorite(db: &PgPool, id: Uuid, favorite: bool) -> Result<Workout, sqlx::Error> {
        sqlx::query_as::<_, Workout>(
            r#"
            UPDATE workouts
            SET is_favorite = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, name, description, status, total_points, completed_at,
                      is_favorite, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(favorite)
        .fetch_one(db)
        .await
    }

    /// Entries go with the workout (`ON DELETE CASCADE`).
    pub async fn delete<'e, E>(db: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let res = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn count_completed_since(
        db: &PgPool,
        user_id: Uuid,
        since: OffsetDateTime,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM workouts
            WHERE user_id = $1 AND status = 'COMPLETED' AND completed_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(db)
        .await
    }

    pub async fn average_completed_points(db: &PgPool, user_id: Uuid) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(AVG(total_points), 0)::float8
            FROM workouts
            WHERE user_id = $1 AND status = 'COMPLETED'
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await
    }
}

impl WorkoutEntry {
    /// Entries of one workout in display order.
    pub async fn list<'e, E>(db: E, workout_id: Uuid) -> Result<Vec<WorkoutEntry>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, WorkoutEntry>(
            r#"
            SELECT we.id, we.workout_id, we.exercise_id, e.name AS exercise_name, e.category,
                   e.points_reward, we.sets, we.reps, we.rest_seconds, we.order_index,
                   we.notes, we.is_completed
            FROM workout_exercises we
            JOIN exercises e ON e.id = we.exercise_id
            WHERE we.workout_id = $1
            ORDER BY we.order_index ASC, we.id ASC
            "#,
        )
        .bind(workout_id)
        .fetch_all(db)
        .await
    }

    pub async fn list_for_workouts(
        db: &PgPool,
        workout_ids: &[Uuid],
    ) -> Result<Vec<WorkoutEntry>, sqlx::Error> {
        sqlx::query_as::<_, WorkoutEntry>(
            r#"
            SELECT we.id, we.workout_id, we.exercise_id, e.name AS exercise_name, e.category,
                   e.points_reward, we.sets, we.reps, we.rest_seconds, we.order_index,
                   we.notes, we.is_completed
            FROM workout_exercises we
            JOIN exercises e ON e.id = we.exercise_id
            WHERE we.workout_id = ANY($1)
            ORDER BY we.workout_id, we.order_index ASC, we.id ASC
            "#,
        )
        .bind(workout_ids)
        .fetch_all(db)
        .await
    }

    /// Missing `order_index` values fall back to the position in `entries`.
    pub async fn insert_all(
        conn: &mut PgConnection,
        workout_id: Uuid,
        entries: &[WorkoutEntryRequest],
    ) -> Result<(), sqlx::Error> {
        for (position, entry) in entries.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO workout_exercises
                    (workout_id, exercise_id, sets, reps, rest_seconds, order_index, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(workout_id)
            .bind(entry.exercise_id)
            .bind(entry.sets)
            .bind(entry.reps)
            .bind(entry.rest_seconds)
            .bind(entry.order_index.unwrap_or(position as i32))
            .bind(&entry.notes)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn delete_for_workout<'e, E>(db: E, workout_id: Uuid) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(workout_id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn mark_all_completed<'e, E>(db: E, workout_id: Uuid) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("UPDATE workout_exercises SET is_completed = TRUE WHERE workout_id = $1")
            .bind(workout_id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Distinct exercises across the user's completed workouts.
    pub async fn count_distinct_completed<'e, E>(db: E, user_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT we.exercise_id)
            FROM workout_exercises we
            JOIN workouts w ON w.id = we.workout_id
            WHERE w.user_id = $1 AND w.status = 'COMPLETED'
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await
    }
}
