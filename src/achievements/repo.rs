use sqlx::{FromRow, PgExecutor, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::achievements::{
    dto::AchievementRequest,
    repo_types::{Achievement, UnlockRecord},
};

/// Unlock joined with its catalog entry.
#[derive(Debug, Clone, FromRow)]
pub struct UnlockedAchievementRow {
    #[sqlx(flatten)]
    pub achievement: Achievement,
    pub unlocked_at: OffsetDateTime,
    pub progress_value: Option<i64>,
}

impl Achievement {
    pub async fn list_active<'e, E>(db: E) -> Result<Vec<Achievement>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Achievement>(
            r#"
            SELECT id, name, description, kind, icon_url, required_value, points_reward,
                   rarity, is_active, created_at, updated_at
            FROM achievements
            WHERE is_active
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .fetch_all(db)
        .await
    }

    /// Whole catalog, inactive entries included.
    pub async fn list_all(db: &PgPool) -> Result<Vec<Achievement>, sqlx::Error> {
        sqlx::query_as::<_, Achievement>(
            r#"
            SELECT id, name, description, kind, icon_url, required_value, points_reward,
                   rarity, is_active, created_at, updated_at
            FROM achievements
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn find<'e, E>(db: E, id: Uuid) -> Result<Option<Achievement>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Achievement>(
            r#"
            SELECT id, name, description, kind, icon_url, required_value, points_reward,
                   rarity, is_active, created_at, updated_at
            FROM achievements
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, req: &AchievementRequest) -> Result<Achievement, sqlx::Error> {
        sqlx::query_as::<_, Achievement>(
            r#"
            INSERT INTO achievements
                (name, description, kind, icon_url, required_value, points_reward, rarity, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, kind, icon_url, required_value, points_reward,
                      rarity, is_active, created_at, updated_at
            "#,
        )
        .bind(req.name.trim())
        .bind(&req.description)
        .bind(req.kind)
        .bind(&req.icon_url)
        .bind(req.required_value)
        .bind(req.points_reward)
        .bind(req.rarity)
        .bind(req.active_on_create())
        .fetch_one(db)
        .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        req: &AchievementRequest,
    ) -> Result<Option<Achievement>, sqlx::Error> {
        sqlx::query_as::<_, Achievement>(
            r#"
            UPDATE achievements
            SET name = $2, description = $3, kind = $4, icon_url = $5, required_value = $6,
                points_reward = $7, rarity = $8, is_active = COALESCE($9, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, kind, icon_url, required_value, points_reward,
                      rarity, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(req.name.trim())
        .bind(&req.description)
        .bind(req.kind)
        .bind(&req.icon_url)
        .bind(req.required_value)
        .bind(req.points_reward)
        .bind(req.rarity)
        .bind(req.is_active)
        .fetch_optional(db)
        .await
    }

    /// Soft delete: unlock records keep pointing at the entry.
    pub async fn deactivate(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE achievements SET is_active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn count(db: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM achievements")
            .fetch_one(db)
            .await
    }
}

impl UnlockRecord {
    pub async fn achievement_ids<'e, E>(db: E, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT achievement_id FROM user_achievements WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn exists<'e, E>(db: E, user_id: Uuid, achievement_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_achievements WHERE user_id = $1 AND achievement_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(achievement_id)
        .fetch_one(db)
        .await
    }

    /// `None` when the pair is already in the ledger.
    pub async fn insert<'e, E>(
        db: E,
        user_id: Uuid,
        achievement_id: Uuid,
        unlocked_at: OffsetDateTime,
        progress_value: Option<i64>,
    ) -> Result<Option<UnlockRecord>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UnlockRecord>(
            r#"
            INSERT INTO user_achievements (user_id, achievement_id, unlocked_at, progress_value)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, achievement_id) DO NOTHING
            RETURNING id, user_id, achievement_id, unlocked_at, progress_value
            "#,
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(unlocked_at)
        .bind(progress_value)
        .fetch_optional(db)
        .await
    }

    /// Newest first. `limit = None` returns everything.
    pub async fn list_for_user(
        db: &PgPool,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<UnlockedAchievementRow>, sqlx::Error> {
        sqlx::query_as::<_, UnlockedAchievementRow>(
            r#"
            SELECT a.id, a.name, a.description, a.kind, a.icon_url, a.required_value,
                   a.points_reward, a.rarity, a.is_active, a.created_at, a.updated_at,
                   ua.unlocked_at, ua.progress_value
            FROM user_achievements ua
            JOIN achievements a ON a.id = ua.achievement_id
            WHERE ua.user_id = $1
            ORDER BY ua.unlocked_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
    }
}
