use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::users::repo_types::{LeaderboardRow, NewUser, User};

impl User {
    /// Find a user by identity subject.
    pub async fn find<'e, E>(db: E, id: Uuid) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, total_points, current_level,
                   workouts_completed, is_active, last_workout_at, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Same as `find`, but holds the row lock until the transaction ends.
    pub async fn find_for_update<'e, E>(db: E, id: Uuid) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, total_points, current_level,
                   workouts_completed, is_active, last_workout_at, created_at, updated_at
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Insert the user unless the subject is already known.
    pub async fn provision(db: &PgPool, new: &NewUser) -> Result<User, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(new.id)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .execute(db)
        .await?;

        User::find(db, new.id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Persist the progression fields.
    pub async fn save_stats<'e, E>(db: E, user: &User) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            UPDATE users
            SET total_points = $2,
                current_level = $3,
                workouts_completed = $4,
                last_workout_at = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(user.total_points)
        .bind(user.current_level)
        .bind(user.workouts_completed)
        .bind(user.last_workout_at)
        .bind(user.updated_at)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, total_points, current_level,
                   workouts_completed, is_active, last_workout_at, created_at, updated_at
            FROM users
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn count(db: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await
    }

    /// Active users by points, then level.
    pub async fn leaderboard(db: &PgPool, limit: i64) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT u.username, u.total_points, u.current_level, u.workouts_completed,
                   COUNT(ua.id) AS achievements_count
            FROM users u
            LEFT JOIN user_achievements ua ON ua.user_id = u.id
            WHERE u.is_active
            GROUP BY u.id
            ORDER BY u.total_points DESC, u.current_level DESC, u.username ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await
    }

    pub async fn achievements_count(db: &PgPool, id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_achievements WHERE user_id = $1")
            .bind(id)
            .fetch_one(db)
            .await
    }
}
