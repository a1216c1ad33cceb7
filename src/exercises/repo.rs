use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::exercises::{
    dto::ExerciseRequest,
    repo_types::{Category, Exercise},
};

impl Exercise {
    pub async fn list_active(db: &PgPool) -> Result<Vec<Exercise>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, name, description, points_reward, difficulty, category,
                   estimated_duration_minutes, is_active, created_at, updated_at
            FROM exercises
            WHERE is_active
            ORDER BY name ASC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn list_all(db: &PgPool) -> Result<Vec<Exercise>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, name, description, points_reward, difficulty, category,
                   estimated_duration_minutes, is_active, created_at, updated_at
            FROM exercises
            ORDER BY name ASC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn list_by_category(
        db: &PgPool,
        category: Category,
    ) -> Result<Vec<Exercise>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, name, description, points_reward, difficulty, category,
                   estimated_duration_minutes, is_active, created_at, updated_at
            FROM exercises
            WHERE is_active AND category = $1
            ORDER BY name ASC
            "#,
        )
        .bind(category)
        .fetch_all(db)
        .await
    }

    pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Exercise>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, name, description, points_reward, difficulty, category,
                   estimated_duration_minutes, is_active, created_at, updated_at
            FROM exercises
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Rows for the given ids; unknown ids are simply absent.
    pub async fn find_many<'e, E>(db: E, ids: &[Uuid]) -> Result<Vec<Exercise>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Exercise>(
            r#"
            SELECT id, name, description, points_reward, difficulty, category,
                   estimated_duration_minutes, is_active, created_at, updated_at
            FROM exercises
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await
    }

    pub async fn create(db: &PgPool, req: &ExerciseRequest) -> Result<Exercise, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            r#"
            INSERT INTO exercises
                (name, description, points_reward, difficulty, category,
                 estimated_duration_minutes, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, points_reward, difficulty, category,
                      estimated_duration_minutes, is_active, created_at, updated_at
            "#,
        )
        .bind(req.name.trim())
        .bind(&req.description)
        .bind(req.points_reward)
        .bind(req.difficulty)
        .bind(req.category)
        .bind(req.estimated_duration_minutes)
        .bind(req.active_on_create())
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        req: &ExerciseRequest,
    ) -> Result<Option<Exercise>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            r#"
            UPDATE exercises
            SET name = $2, description = $3, points_reward = $4, difficulty = $5,
                category = $6, estimated_duration_minutes = $7, is_active = COALESCE($8, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, points_reward, difficulty, category,
                      estimated_duration_minutes, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(req.name.trim())
        .bind(&req.description)
        .bind(req.points_reward)
        .bind(req.difficulty)
        .bind(req.category)
        .bind(req.estimated_duration_minutes)
        .bind(req.is_active)
        .fetch_optional(db)
        .await
    }

    /// Deletion keeps the row so existing workouts stay readable.
    pub async fn deactivate(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE exercises SET is_active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn count(db: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM exercises")
            .fetch_one(db)
            .await
    }
}
