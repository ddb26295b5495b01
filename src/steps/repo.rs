use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::steps::dto::DailyStepsFilter;
use crate::steps::repo_types::{DailySteps, StepGoal, StepStreak};

const DAILY_STEPS_COLUMNS: &str = r#"
    id, user_id, date, steps, distance_km, calories_burned, active_minutes,
    notes, source, created_at, updated_at
"#;

const STEP_GOAL_COLUMNS: &str = "id, user_id, daily_goal, created_at, updated_at";

const STEP_STREAK_COLUMNS: &str = r#"
    id, user_id, current_streak, longest_streak, last_updated, total_days_goal_met,
    created_at, updated_at
"#;

impl DailySteps {
    /// `goal_achieved` compares against `daily_goal` and is ignored when
    /// the user has no goal.
    pub async fn list_filtered(
        db: &PgPool,
        user_id: Uuid,
        filter: &DailyStepsFilter,
        daily_goal: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DailySteps>, sqlx::Error> {
        let goal_achieved = daily_goal.and(filter.goal_achieved);
        sqlx::query_as::<_, DailySteps>(&format!(
            r#"
            SELECT {DAILY_STEPS_COLUMNS}
            FROM daily_steps
            WHERE user_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
              AND ($4::text IS NULL OR source = $4)
              AND ($5::bool IS NULL OR (steps >= $6::int) = $5)
            ORDER BY date DESC
            LIMIT $7 OFFSET $8
            "#
        ))
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.source.map(|s| s.as_str()))
        .bind(goal_achieved)
        .bind(daily_goal)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Records with `from <= date <= to`, oldest first.
    pub async fn list_between(
        db: &PgPool,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> Result<Vec<DailySteps>, sqlx::Error> {
        sqlx::query_as::<_, DailySteps>(&format!(
            r#"
            SELECT {DAILY_STEPS_COLUMNS}
            FROM daily_steps
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date ASC
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await
    }

    pub async fn find(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<DailySteps>, sqlx::Error> {
        sqlx::query_as::<_, DailySteps>(&format!(
            "SELECT {DAILY_STEPS_COLUMNS} FROM daily_steps WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_date(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
    ) -> Result<Option<DailySteps>, sqlx::Error> {
        sqlx::query_as::<_, DailySteps>(&format!(
            "SELECT {DAILY_STEPS_COLUMNS} FROM daily_steps WHERE user_id = $1 AND date = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(db)
        .await
    }

    /// A second record for the same day fails on `daily_steps_user_date_key`.
    pub async fn insert(&self, db: &PgPool) -> Result<DailySteps, sqlx::Error> {
        sqlx::query_as::<_, DailySteps>(&format!(
            r#"
            INSERT INTO daily_steps (user_id, date, steps, distance_km, calories_burned,
                                     active_minutes, notes, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {DAILY_STEPS_COLUMNS}
            "#
        ))
        .bind(self.user_id)
        .bind(self.date)
        .bind(self.steps)
        .bind(self.distance_km)
        .bind(self.calories_burned)
        .bind(self.active_minutes)
        .bind(&self.notes)
        .bind(self.source.as_str())
        .fetch_one(db)
        .await
    }

    pub async fn save(&self, db: &PgPool) -> Result<DailySteps, sqlx::Error> {
        sqlx::query_as::<_, DailySteps>(&format!(
            r#"
            UPDATE daily_steps
               SET date = $3, steps = $4, distance_km = $5, calories_burned = $6,
                   active_minutes = $7, notes = $8, source = $9, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {DAILY_STEPS_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.date)
        .bind(self.steps)
        .bind(self.distance_km)
        .bind(self.calories_burned)
        .bind(self.active_minutes)
        .bind(&self.notes)
        .bind(self.source.as_str())
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM daily_steps WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

impl StepGoal {
    pub async fn find_for_user(db: &PgPool, user_id: Uuid) -> Result<Option<StepGoal>, sqlx::Error> {
        sqlx::query_as::<_, StepGoal>(&format!(
            "SELECT {STEP_GOAL_COLUMNS} FROM step_goals WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, user_id: Uuid, daily_goal: i32) -> Result<StepGoal, sqlx::Error> {
        sqlx::query_as::<_, StepGoal>(&format!(
            r#"
            INSERT INTO step_goals (user_id, daily_goal)
            VALUES ($1, $2)
            RETURNING {STEP_GOAL_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(daily_goal)
        .fetch_one(db)
        .await
    }

    /// Creates the goal with `daily_goal` unless one exists; returns the stored goal.
    pub async fn get_or_create(
        db: &PgPool,
        user_id: Uuid,
        daily_goal: i32,
    ) -> Result<StepGoal, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO step_goals (user_id, daily_goal)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(daily_goal)
        .execute(db)
        .await?;

        sqlx::query_as::<_, StepGoal>(&format!(
            "SELECT {STEP_GOAL_COLUMNS} FROM step_goals WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    pub async fn save(&self, db: &PgPool) -> Result<StepGoal, sqlx::Error> {
        sqlx::query_as::<_, StepGoal>(&format!(
            r#"
            UPDATE step_goals
               SET daily_goal = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {STEP_GOAL_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.daily_goal)
        .fetch_one(db)
        .await
    }
}

impl StepStreak {
    pub async fn find_for_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<StepStreak>, sqlx::Error> {
        sqlx::query_as::<_, StepStreak>(&format!(
            "SELECT {STEP_STREAK_COLUMNS} FROM step_streaks WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// A new streak starts at zero with `last_updated = today`.
    pub async fn get_or_create(
        db: &PgPool,
        user_id: Uuid,
        today: Date,
    ) -> Result<StepStreak, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO step_streaks (user_id, last_updated)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(today)
        .execute(db)
        .await?;

        sqlx::query_as::<_, StepStreak>(&format!(
            "SELECT {STEP_STREAK_COLUMNS} FROM step_streaks WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    pub async fn save(&self, db: &PgPool) -> Result<StepStreak, sqlx::Error> {
        sqlx::query_as::<_, StepStreak>(&format!(
            r#"
            UPDATE step_streaks
               SET current_streak = $2, longest_streak = $3, last_updated = $4,
                   total_days_goal_met = $5, updated_at = now()
             WHERE id = $1
            RETURNING {STEP_STREAK_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(self.current_streak)
        .bind(self.longest_streak)
        .bind(self.last_updated)
        .bind(self.total_days_goal_met)
        .fetch_one(db)
        .await
    }
}
