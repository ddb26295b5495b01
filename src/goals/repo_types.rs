use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::common::{round_to, text_enum, to_f64};

text_enum! {
    pub enum GoalType {
        Running => ("running", "Running (km)"),
        Cycling => ("cycling", "Cycling (km)"),
        Swimming => ("swimming", "Swimming (km)"),
        Walking => ("walking", "Walking (km)"),
        Weight => ("weight", "Weight (kg)"),
        Calories => ("calories", "Calories Burned"),
        Workouts => ("workouts", "Number of Workouts"),
        Strength => ("strength", "Strength Training (sessions)"),
        Yoga => ("yoga", "Yoga (sessions)"),
        Other => ("other", "Other"),
    }
}

impl Default for GoalType {
    fn default() -> Self {
        GoalType::Other
    }
}

impl GoalType {
    pub fn unit(&self) -> &'static str {
        match self {
            GoalType::Running | GoalType::Cycling | GoalType::Swimming | GoalType::Walking => "km",
            GoalType::Weight => "kg",
            GoalType::Calories => "cal",
            GoalType::Workouts => "workouts",
            GoalType::Strength | GoalType::Yoga => "sessions",
            GoalType::Other => "",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub goal_type: GoalType,
    pub title: String,
    pub target_value: Decimal,
    pub current_value: Decimal,
    pub start_date: Date,
    pub end_date: Date,
    pub is_completed: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Goal {
    /// Runs before every write: fills a default title and keeps the
    /// completion flag in step with `current_value`.
    ///
    /// A completed goal whose value drops back below target is reopened.
    pub fn before_save(&mut self, now: OffsetDateTime) {
        if self.title.trim().is_empty() {
            self.title = format!("{} Goal", self.goal_type.label());
        }

        let reached = self.current_value >= self.target_value;
        if !self.is_completed && reached {
            self.is_completed = true;
            self.completed_at = Some(now);
        } else if self.is_completed && !reached {
            self.is_completed = false;
            self.completed_at = None;
        }
    }

    /// 0..=100, two decimals.
    pub fn progress_percentage(&self) -> f64 {
        if self.target_value.is_zero() {
            return 0.0;
        }
        let pct = to_f64(self.current_value) / to_f64(self.target_value) * 100.0;
        round_to(pct.min(100.0), 2)
    }

    /// Whole days until `end_date`, never negative.
    pub fn time_remaining(&self, today: Date) -> i64 {
        (self.end_date - today).whole_days().max(0)
    }

    pub fn is_active(&self, today: Date) -> bool {
        self.start_date <= today && today <= self.end_date && !self.is_completed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::macros::{date, datetime};

    pub(crate) fn goal(target: i64, current: i64) -> Goal {
        let now = datetime!(2026-10-01 00:00 UTC);
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            goal_type: GoalType::Running,
            title: String::new(),
            target_value: Decimal::from(target),
            current_value: Decimal::from(current),
            start_date: date!(2026 - 10 - 01),
            end_date: date!(2026 - 10 - 31),
            is_completed: false,
            completed_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn reaching_target_completes_and_regressing_reopens() {
        let now = datetime!(2026-10-15 10:00 UTC);
        let mut g = goal(100, 100);
        g.before_save(now);
        assert!(g.is_completed);
        assert_eq!(g.completed_at, Some(now));

        g.current_value = Decimal::from(50);
        g.before_save(datetime!(2026-10-16 10:00 UTC));
        assert!(!g.is_completed);
        assert_eq!(g.completed_at, None);
    }

    #[test]
    fn completed_at_is_kept_while_still_complete() {
        let first = datetime!(2026-10-15 10:00 UTC);
        let mut g = goal(100, 120);
        g.before_save(first);
        g.current_value = Decimal::from(130);
        g.before_save(datetime!(2026-10-20 10:00 UTC));
        assert_eq!(g.completed_at, Some(first));
    }

    #[test]
    fn blank_title_gets_type_label() {
        let mut g = goal(10, 0);
        g.title = "   ".into();
        g.before_save(datetime!(2026-10-15 10:00 UTC));
        assert_eq!(g.title, "Running (km) Goal");

        let mut g = goal(10, 0);
        g.title = "Half marathon".into();
        g.before_save(datetime!(2026-10-15 10:00 UTC));
        assert_eq!(g.title, "Half marathon");
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(goal(200, 50).progress_percentage(), 25.0);
        assert_eq!(goal(100, 250).progress_percentage(), 100.0);
        assert_eq!(goal(3, 1).progress_percentage(), 33.33);
    }

    #[test]
    fn time_remaining_and_activity() {
        let g = goal(10, 0);
        assert_eq!(g.time_remaining(date!(2026 - 10 - 15)), 16);
        assert_eq!(g.time_remaining(date!(2026 - 11 - 15)), 0);
        assert!(g.is_active(date!(2026 - 10 - 15)));
        assert!(!g.is_active(date!(2026 - 09 - 30)));

        let mut done = goal(10, 10);
        done.before_save(datetime!(2026-10-15 10:00 UTC));
        assert!(!done.is_active(date!(2026 - 10 - 15)));
    }

    #[test]
    fn units_follow_type() {
        assert_eq!(GoalType::Walking.unit(), "km");
        assert_eq!(GoalType::Calories.unit(), "cal");
        assert_eq!(GoalType::Yoga.unit(), "sessions");
        assert_eq!(GoalType::Other.unit(), "");
    }
}
