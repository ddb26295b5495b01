use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::goals::dto::GoalFilter;
use crate::goals::repo_types::Goal;

const GOAL_COLUMNS: &str = r#"
    id, user_id, goal_type, title, target_value, current_value, start_date,
    end_date, is_completed, completed_at, notes, created_at, updated_at
"#;

impl Goal {
    /// `start_date`/`end_date` select goals overlapping that window;
    /// `active` compares against `today`.
    pub async fn list_filtered(
        db: &PgPool,
        user_id: Uuid,
        filter: &GoalFilter,
        today: Date,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Goal>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!(
            r#"
            SELECT {GOAL_COLUMNS}
            FROM goals
            WHERE user_id = $1
              AND ($2::bool IS NULL OR is_completed = $2)
              AND ($3::text IS NULL OR goal_type = $3)
              AND ($4::date IS NULL OR end_date >= $4)
              AND ($5::date IS NULL OR start_date <= $5)
              AND ($6::bool IS NULL
                   OR (start_date <= $7 AND end_date >= $7 AND NOT is_completed) = $6)
              AND ($8::text IS NULL OR title ILIKE '%' || $8 || '%'
                   OR notes ILIKE '%' || $8 || '%')
            ORDER BY end_date DESC, created_at DESC
            LIMIT $9 OFFSET $10
            "#
        ))
        .bind(user_id)
        .bind(filter.is_completed)
        .bind(filter.goal_type.map(|t| t.as_str()))
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.active)
        .bind(today)
        .bind(filter.search.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<Goal>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn insert(&self, db: &PgPool) -> Result<Goal, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!(
            r#"
            INSERT INTO goals (user_id, goal_type, title, target_value, current_value,
                               start_date, end_date, is_completed, completed_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(self.user_id)
        .bind(self.goal_type.as_str())
        .bind(&self.title)
        .bind(self.target_value)
        .bind(self.current_value)
        .bind(self.start_date)
        .bind(self.end_date)
        .bind(self.is_completed)
        .bind(self.completed_at)
        .bind(&self.notes)
        .fetch_one(db)
        .await
    }

    pub async fn save(&self, db: &PgPool) -> Result<Goal, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!(
            r#"
            UPDATE goals
               SET goal_type = $3, title = $4, target_value = $5, current_value = $6,
                   start_date = $7, end_date = $8, is_completed = $9, completed_at = $10,
                   notes = $11, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.goal_type.as_str())
        .bind(&self.title)
        .bind(self.target_value)
        .bind(self.current_value)
        .bind(self.start_date)
        .bind(self.end_date)
        .bind(self.is_completed)
        .bind(self.completed_at)
        .bind(&self.notes)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list_all(db: &PgPool, user_id: Uuid) -> Result<Vec<Goal>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 ORDER BY end_date DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
