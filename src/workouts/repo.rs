use sqlx::PgPool;
use uuid::Uuid;

use crate::workouts::dto::WorkoutFilter;
use crate::workouts::repo_types::Workout;

const WORKOUT_COLUMNS: &str = r#"
    id, user_id, workout_type, title, description, duration, calories_burned,
    distance, intensity, status, notes, workout_date, started_at, completed_at,
    created_at, updated_at
"#;

impl Workout {
    /// All filters are optional; `limit = None` means every matching row.
    pub async fn list_filtered(
        db: &PgPool,
        user_id: Uuid,
        filter: &WorkoutFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Workout>, sqlx::Error> {
        sqlx::query_as::<_, Workout>(&format!(
            r#"
            SELECT {WORKOUT_COLUMNS}
            FROM workouts
            WHERE user_id = $1
              AND ($2::date IS NULL OR workout_date >= $2)
              AND ($3::date IS NULL OR workout_date <= $3)
              AND ($4::text IS NULL OR workout_type = $4)
              AND ($5::text IS NULL OR status = $5)
              AND ($6::text IS NULL OR title ILIKE '%' || $6 || '%'
                   OR description ILIKE '%' || $6 || '%'
                   OR notes ILIKE '%' || $6 || '%')
            ORDER BY workout_date DESC, created_at DESC
            LIMIT $7 OFFSET $8
            "#
        ))
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.workout_type.map(|t| t.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.search.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn find(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Workout>, sqlx::Error> {
        sqlx::query_as::<_, Workout>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Inserts `self` for its `user_id`; id and timestamps come from the database.
    pub async fn insert(&self, db: &PgPool) -> Result<Workout, sqlx::Error> {
        sqlx::query_as::<_, Workout>(&format!(
            r#"
            INSERT INTO workouts (user_id, workout_type, title, description, duration,
                                  calories_burned, distance, intensity, status, notes,
                                  workout_date, started_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {WORKOUT_COLUMNS}
            "#
        ))
        .bind(self.user_id)
        .bind(self.workout_type.as_str())
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.duration)
        .bind(self.calories_burned)
        .bind(self.distance)
        .bind(self.intensity.as_str())
        .bind(self.status.as_str())
        .bind(&self.notes)
        .bind(self.workout_date)
        .bind(self.started_at)
        .bind(self.completed_at)
        .fetch_one(db)
        .await
    }

    pub async fn save(&self, db: &PgPool) -> Result<Workout, sqlx::Error> {
        sqlx::query_as::<_, Workout>(&format!(
            r#"
            UPDATE workouts
               SET workout_type = $3, title = $4, description = $5, duration = $6,
                   calories_burned = $7, distance = $8, intensity = $9, status = $10,
                   notes = $11, workout_date = $12, started_at = $13, completed_at = $14,
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {WORKOUT_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.workout_type.as_str())
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.duration)
        .bind(self.calories_burned)
        .bind(self.distance)
        .bind(self.intensity.as_str())
        .bind(self.status.as_str())
        .bind(&self.notes)
        .bind(self.workout_date)
        .bind(self.started_at)
        .bind(self.completed_at)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
