use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

use crate::common::{percent, round_to, text_enum, to_f64};

/// Average stride: 1 km is about 1250 steps.
pub const STEPS_PER_KM: i64 = 1250;
/// Goal shown in weekly/monthly/chart views when the user has none.
pub const DEFAULT_DAILY_GOAL: i32 = 10_000;
pub const MIN_DAILY_GOAL: i32 = 1_000;
pub const MAX_DAILY_GOAL: i32 = 100_000;
pub const MAX_DAILY_STEPS: i32 = 200_000;
pub const MAX_ACTIVE_MINUTES: i32 = 1_440;

/// 100 steps burn about 5 kcal.
fn kcal_per_step() -> Decimal {
    Decimal::new(5, 2)
}

text_enum! {
    pub enum StepSource {
        Manual => ("manual", "Manual Entry"),
        Fitbit => ("fitbit", "Fitbit"),
        AppleHealth => ("apple_health", "Apple Health"),
        GoogleFit => ("google_fit", "Google Fit"),
        SamsungHealth => ("samsung_health", "Samsung Health"),
        Other => ("other", "Other"),
    }
}

impl Default for StepSource {
    fn default() -> Self {
        StepSource::Manual
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StepGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub daily_goal: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailySteps {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub steps: i32,
    pub distance_km: Option<Decimal>,
    pub calories_burned: Option<i32>,
    pub active_minutes: Option<i32>,
    pub notes: Option<String>,
    #[sqlx(try_from = "String")]
    pub source: StepSource,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn distance_for(steps: i32) -> Decimal {
    (Decimal::from(steps) / Decimal::from(STEPS_PER_KM)).round_dp(2)
}

fn calories_for(steps: i32) -> i32 {
    (Decimal::from(steps) * kcal_per_step())
        .round()
        .to_i32()
        .unwrap_or(0)
}

impl DailySteps {
    /// Fills distance and calories from the step count when they are
    /// missing or zero. Runs on every save.
    pub fn fill_estimates(&mut self) {
        if self.steps <= 0 {
            return;
        }
        if self.distance_km.map_or(true, |d| d.is_zero()) {
            self.distance_km = Some(distance_for(self.steps));
        }
        if self.calories_burned.map_or(true, |c| c == 0) {
            self.calories_burned = Some(calories_for(self.steps));
        }
    }

    /// False when the user has no goal.
    pub fn goal_achieved(&self, daily_goal: Option<i32>) -> bool {
        daily_goal.is_some_and(|goal| self.steps >= goal)
    }

    pub fn goal_percentage(&self, daily_goal: Option<i32>) -> f64 {
        match daily_goal {
            Some(goal) if goal > 0 => round_to(percent(self.steps as f64, goal as f64), 1),
            _ => 0.0,
        }
    }

    pub fn estimated_distance_km(&self) -> f64 {
        match self.distance_km {
            Some(d) if !d.is_zero() => to_f64(d),
            _ => to_f64(distance_for(self.steps)),
        }
    }

    pub fn estimated_calories(&self) -> i32 {
        match self.calories_burned {
            Some(c) if c != 0 => c,
            _ => calories_for(self.steps),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StepStreak {
    pub id: Uuid,
    pub user_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_updated: Date,
    pub total_days_goal_met: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl StepStreak {
    /// Advances the streak for `today` given the user's daily goal and
    /// yesterday's step count (if a record exists). Returns `true` when the
    /// streak changed and must be persisted. Without a goal, or on a second
    /// call the same day, nothing changes.
    pub fn advance(
        &mut self,
        daily_goal: Option<i32>,
        yesterday_steps: Option<i32>,
        today: Date,
    ) -> bool {
        let Some(daily_goal) = daily_goal else {
            return false;
        };
        if self.last_updated == today {
            return false;
        }
        let yesterday = today - Duration::days(1);

        match yesterday_steps {
            Some(steps) if steps >= daily_goal => {
                self.current_streak += 1;
                self.total_days_goal_met += 1;
                self.longest_streak = self.longest_streak.max(self.current_streak);
            }
            Some(_) => self.current_streak = 0,
            // no record: only a gap of more than one day breaks the streak
            None if self.last_updated < yesterday => self.current_streak = 0,
            None => {}
        }

        self.last_updated = today;
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::macros::{date, datetime};

    pub(crate) fn record(day: Date, steps: i32) -> DailySteps {
        let now = datetime!(2026-10-15 20:00 UTC);
        DailySteps {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: day,
            steps,
            distance_km: None,
            calories_burned: None,
            active_minutes: None,
            notes: None,
            source: StepSource::Manual,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn streak(last_updated: Date) -> StepStreak {
        let now = datetime!(2026-10-01 00:00 UTC);
        StepStreak {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            current_streak: 0,
            longest_streak: 0,
            last_updated,
            total_days_goal_met: 0,
            created_at: now,
            updated_at: now,
        }
    }

    const TODAY: Date = date!(2026 - 10 - 15);

    #[test]
    fn goal_met_yesterday_extends_streak() {
        let mut s = streak(date!(2026 - 10 - 14));
        assert!(s.advance(Some(10_000), Some(12_000), TODAY));
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.longest_streak, 1);
        assert_eq!(s.total_days_goal_met, 1);
        assert_eq!(s.last_updated, TODAY);
    }

    #[test]
    fn advance_is_idempotent_within_a_day() {
        let mut s = streak(date!(2026 - 10 - 14));
        s.advance(Some(10_000), Some(12_000), TODAY);
        let before = (s.current_streak, s.longest_streak, s.total_days_goal_met);
        assert!(!s.advance(Some(10_000), Some(12_000), TODAY));
        assert_eq!(before, (s.current_streak, s.longest_streak, s.total_days_goal_met));
    }

    #[test]
    fn no_goal_leaves_streak_untouched() {
        let mut s = streak(date!(2026 - 10 - 12));
        s.current_streak = 3;
        assert!(!s.advance(None, Some(12_000), TODAY));
        assert_eq!(s.current_streak, 3);
        assert_eq!(s.total_days_goal_met, 0);
        assert_eq!(s.last_updated, date!(2026 - 10 - 12));
    }

    #[test]
    fn missed_goal_resets_current_only() {
        let mut s = streak(date!(2026 - 10 - 14));
        s.current_streak = 4;
        s.longest_streak = 6;
        s.advance(Some(10_000), Some(9_999), TODAY);
        assert_eq!(s.current_streak, 0);
        assert_eq!(s.longest_streak, 6);
    }

    #[test]
    fn missing_record_breaks_only_after_a_gap() {
        let mut fresh = streak(date!(2026 - 10 - 14));
        fresh.current_streak = 3;
        fresh.advance(Some(10_000), None, TODAY);
        assert_eq!(fresh.current_streak, 3);
        assert_eq!(fresh.last_updated, TODAY);

        let mut stale = streak(date!(2026 - 10 - 12));
        stale.current_streak = 3;
        stale.advance(Some(10_000), None, TODAY);
        assert_eq!(stale.current_streak, 0);
    }

    #[test]
    fn longest_tracks_the_maximum() {
        let mut s = streak(date!(2026 - 10 - 14));
        s.current_streak = 2;
        s.longest_streak = 2;
        s.advance(Some(5_000), Some(5_000), TODAY);
        assert_eq!((s.current_streak, s.longest_streak), (3, 3));
    }

    #[test]
    fn estimates_fill_missing_values() {
        let mut r = record(TODAY, 12_500);
        r.fill_estimates();
        assert_eq!(r.distance_km, Some(Decimal::new(1000, 2)));
        assert_eq!(r.calories_burned, Some(625));
    }

    #[test]
    fn estimates_keep_supplied_values() {
        let mut r = record(TODAY, 12_500);
        r.distance_km = Some(Decimal::new(83, 1));
        r.calories_burned = Some(500);
        r.fill_estimates();
        assert_eq!(r.distance_km, Some(Decimal::new(83, 1)));
        assert_eq!(r.calories_burned, Some(500));

        let mut zero = record(TODAY, 0);
        zero.fill_estimates();
        assert_eq!(zero.distance_km, None);
        assert_eq!(zero.calories_burned, None);
    }

    #[test]
    fn goal_helpers_without_goal() {
        let r = record(TODAY, 8_000);
        assert!(!r.goal_achieved(None));
        assert_eq!(r.goal_percentage(None), 0.0);
        assert!(r.goal_achieved(Some(8_000)));
        assert_eq!(r.goal_percentage(Some(12_000)), 66.7);
    }

    #[test]
    fn estimated_values_fall_back_to_steps() {
        let r = record(TODAY, 2_500);
        assert_eq!(r.estimated_distance_km(), 2.0);
        assert_eq!(r.estimated_calories(), 125);
    }
}
